use crate::error::SchemaError;
use crate::schema::BlockSchema;
use ahash::AHashMap;
use itertools::Itertools;

pub(super) fn index_fields(schema: &BlockSchema) -> Result<AHashMap<String, usize>, SchemaError> {
    if let Some(key) = schema.fields.iter().map(|f| &f.key).duplicates().next() {
        return Err(SchemaError::DuplicateField {
            block_type: schema.block_type.clone(),
            key: key.clone(),
        });
    }
    Ok(schema
        .fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f.key.clone(), i))
        .collect())
}

pub(super) fn check_conditions(
    schema: &BlockSchema,
    index: &AHashMap<String, usize>,
) -> Result<(), SchemaError> {
    for field in &schema.fields {
        let Some(condition) = &field.visibility_condition else {
            continue;
        };
        if !index.contains_key(&condition.on_field) {
            return Err(SchemaError::UnknownConditionField {
                field: field.key.clone(),
                on_field: condition.on_field.clone(),
            });
        }
        if condition.matches_any_of.is_empty() {
            return Err(SchemaError::EmptyCondition {
                field: field.key.clone(),
            });
        }
    }
    Ok(())
}

/// Checks the discriminator and its tool table. Returns the discriminator's index.
pub(super) fn check_operation(
    schema: &BlockSchema,
    index: &AHashMap<String, usize>,
    strict_options: bool,
) -> Result<Option<usize>, SchemaError> {
    let Some(operation_field) = &schema.operation_field else {
        if !schema.operation_to_tool.is_empty() {
            return Err(SchemaError::InvalidDefinition(format!(
                "block '{}' maps operations to tools but has no operation field",
                schema.block_type
            )));
        }
        if schema.tool.is_none() {
            return Err(SchemaError::MissingTool(schema.block_type.clone()));
        }
        return Ok(None);
    };

    let position = *index
        .get(operation_field)
        .ok_or_else(|| SchemaError::UnknownOperationField(operation_field.clone()))?;
    let field = &schema.fields[position];

    if field.visibility_condition.is_some() {
        return Err(SchemaError::ConditionalOperationField(
            operation_field.clone(),
        ));
    }

    let has_fallback = schema.fallback_tool.is_some();
    if schema.operation_to_tool.is_empty() && !has_fallback {
        return Err(SchemaError::EmptyOperationMap(operation_field.clone()));
    }

    if !field.options.is_empty() {
        for (value, tool) in &schema.operation_to_tool {
            if !field.options.iter().any(|o| &o.id == value) {
                return Err(SchemaError::UnreachableOperation {
                    field: operation_field.clone(),
                    value: value.clone(),
                    tool: tool.clone(),
                });
            }
        }
        if strict_options && !has_fallback {
            if let Some(option) = field
                .options
                .iter()
                .find(|o| !schema.operation_to_tool.contains_key(&o.id))
            {
                return Err(SchemaError::UnmappedOperation {
                    field: operation_field.clone(),
                    value: option.id.clone(),
                });
            }
        }
    }

    Ok(Some(position))
}

/// A canonical key must not name a field that feeds a different parameter: raw values
/// supplied under that key would be ambiguous.
pub(super) fn check_canonical_keys(
    schema: &BlockSchema,
    index: &AHashMap<String, usize>,
) -> Result<(), SchemaError> {
    for field in &schema.fields {
        let Some(canonical_key) = &field.canonical_key else {
            continue;
        };
        if let Some(&other) = index.get(canonical_key) {
            let colliding = &schema.fields[other];
            if colliding.output_key() != canonical_key {
                return Err(SchemaError::CanonicalKeyCollision {
                    canonical_key: canonical_key.clone(),
                    field: field.key.clone(),
                    colliding_field: colliding.key.clone(),
                });
            }
        }
    }
    Ok(())
}
