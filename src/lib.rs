//! # Blockform - Block Schema Resolution Engine
//!
//! **Blockform** turns the declarative definition of a workflow block (its form fields,
//! their visibility rules, aliases and types, and the tools it can call) plus the raw
//! values a user entered into one validated tool call.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic. It operates on a canonical [`schema::BlockSchema`],
//! and the primary workflow is:
//!
//! 1.  **Describe the block**: Build a `BlockSchema` in code, deserialize one from JSON, or implement `IntoBlockSchema` for your own block format.
//! 2.  **Compile**: `SchemaCompiler::builder(schema).build().compile()` validates the schema once (unknown condition fields, unmapped operations, condition cycles, ...) and indexes it into a `CompiledBlock`.
//! 3.  **Resolve**: Call `resolve` with the raw form values for each execution. The result is either the tool to call with its typed parameters, or every problem with the input at once.
//!
//! Resolution runs in fixed stages: defaults are applied, the operation field picks the
//! tool, visibility conditions decide which fields are active, active values are coerced
//! to their declared types, alias fields are merged into their canonical parameter, and
//! required parameters are checked.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blockform::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let schema = BlockSchema::new("calendar")
//!         .with_field(FieldSchema::string("operation").with_options(["create", "update"]))
//!         .with_field(FieldSchema::string("name").required())
//!         .with_field(
//!             FieldSchema::string("id")
//!                 .required()
//!                 .visible_when("operation", ["update"]),
//!         )
//!         .with_operation(
//!             "operation",
//!             [("create", "calendar_create"), ("update", "calendar_update")],
//!         );
//!
//!     let block = SchemaCompiler::builder(schema).build().compile()?;
//!
//!     let mut inputs = RawInputMap::new();
//!     inputs.insert("operation".to_string(), "create".into());
//!     inputs.insert("name".to_string(), "Bob".into());
//!
//!     match block.resolve(&inputs) {
//!         Ok(call) => println!("-> {} {}", call.tool_id, call.parameters_json()),
//!         Err(errors) => {
//!             for error in errors.iter() {
//!                 println!("-> {}", error);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod coercion;
pub mod compiler;
pub mod condition;
pub mod error;
pub mod merge;
pub mod prelude;
pub mod registry;
pub mod resolver;
pub mod router;
pub mod schema;
pub mod value;
pub mod visibility;
