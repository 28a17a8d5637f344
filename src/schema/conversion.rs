use super::definition::BlockSchema;
use crate::error::SchemaError;

/// A trait for custom block formats that can be converted into a [`BlockSchema`].
///
/// This is the extension point that keeps the engine independent of how blocks are
/// written down. Implement it on the structs your block files deserialize into, and
/// the converted schema can be compiled and registered like any other.
///
/// # Example
///
/// ```rust,no_run
/// use blockform::prelude::*;
/// use blockform::error::SchemaError;
///
/// struct MyBlock { name: String, tool: String, inputs: Vec<String> }
///
/// impl IntoBlockSchema for MyBlock {
///     fn into_block_schema(self) -> std::result::Result<BlockSchema, SchemaError> {
///         let mut schema = BlockSchema::new(&self.name).with_tool(&self.tool);
///         for input in &self.inputs {
///             schema = schema.with_field(FieldSchema::string(input).required());
///         }
///         Ok(schema)
///     }
/// }
/// ```
pub trait IntoBlockSchema {
    /// Consumes the object and converts it into an engine block schema.
    fn into_block_schema(self) -> Result<BlockSchema, SchemaError>;
}

impl IntoBlockSchema for BlockSchema {
    fn into_block_schema(self) -> Result<BlockSchema, SchemaError> {
        Ok(self)
    }
}

impl IntoBlockSchema for serde_json::Value {
    fn into_block_schema(self) -> Result<BlockSchema, SchemaError> {
        serde_json::from_value(self).map_err(|e| SchemaError::InvalidDefinition(e.to_string()))
    }
}
