use crate::compiler::CompiledBlock;
use crate::error::{ResolutionError, SchemaError};
use crate::value::Value;

/// Picks the tool to invoke for the given coerced discriminator value.
///
/// Blocks without an operation field always use their single tool. Otherwise the
/// value is looked up in the operation table; an unknown or missing value falls back
/// only to a fallback tool the block declares, and is an error otherwise.
pub fn resolve_tool(
    block: &CompiledBlock,
    discriminator: Option<&Value>,
) -> Result<String, ResolutionError> {
    let schema = block.schema();
    let Some(operation_field) = &schema.operation_field else {
        return schema
            .tool
            .clone()
            .ok_or_else(|| SchemaError::MissingTool(schema.block_type.clone()).into());
    };

    let key = discriminator.map(Value::lookup_key);
    if let Some(tool) = key.as_ref().and_then(|k| schema.operation_to_tool.get(k)) {
        return Ok(tool.clone());
    }

    schema
        .fallback_tool
        .clone()
        .ok_or_else(|| ResolutionError::UnresolvedOperation {
            field: operation_field.clone(),
            value: key,
        })
}
