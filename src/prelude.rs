//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the blockform
//! crate. Import this module to get access to the core functionality without having to
//! import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use blockform::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let text = std::fs::read_to_string("path/to/block.json")?;
//! let mut registry = InMemoryRegistry::new();
//! registry.register(BlockFile::from_json(&text)?)?;
//!
//! let inputs = raw_inputs_from_json(serde_json::json!({ "operation": "read" }));
//! let call = resolve_block(&registry, "gmail", &inputs)?;
//! println!("Invoking {}", call.tool_id);
//! # Ok(())
//! # }
//! ```

// Compilation and resolution
pub use crate::compiler::{CompiledBlock, SchemaCompiler};
pub use crate::resolver::{ResolvedParameters, resolve};
pub use crate::visibility::resolve_active_fields;

// Schema model
pub use crate::schema::{
    BlockFile, BlockSchema, DefaultValue, FieldOption, FieldSchema, IntoBlockSchema, NumberKind,
    SchemaBundle, ValueType, VisibilityCondition,
};

// Values
pub use crate::value::{Literal, RawInputMap, RawValue, Value, raw_inputs_from_json};

// Registry
pub use crate::registry::{InMemoryRegistry, SchemaRegistry, resolve_block};

// Error types
pub use crate::error::{
    BundleError, CoercionError, ResolutionError, ResolutionErrors, SchemaError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
