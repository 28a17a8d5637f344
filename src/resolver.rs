use crate::coercion::coerce;
use crate::compiler::CompiledBlock;
use crate::error::{ResolutionError, ResolutionErrors};
use crate::merge::merge_aliases;
use crate::router::resolve_tool;
use crate::value::{RawInputMap, Value};
use crate::visibility::resolve_active_fields;
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// A validated tool call: which tool to invoke and with which typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedParameters {
    #[serde(rename = "toolId")]
    pub tool_id: String,
    pub parameters: IndexMap<String, Value>,
}

impl ResolvedParameters {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// The parameters as a JSON object, in declaration order.
    pub fn parameters_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.parameters
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

/// Resolves raw form values against a compiled block.
///
/// The discriminator is coerced and routed first; a failure there stops resolution
/// immediately because nothing else can be interpreted without knowing the tool.
/// After that, every coercion failure and every missing required parameter is
/// collected, so callers get the complete list of problems in one pass.
pub fn resolve(
    block: &CompiledBlock,
    raw: &RawInputMap,
) -> Result<ResolvedParameters, ResolutionErrors> {
    let effective = block.effective_inputs(raw);
    let mut coerced: AHashMap<String, Value> = AHashMap::with_capacity(effective.len());

    let discriminator = match block.operation_field() {
        Some(field) => match effective.get(&field.key) {
            Some(value) => {
                let value = coerce(field, value).map_err(ResolutionError::from)?;
                coerced.insert(field.key.clone(), value.clone());
                Some(value)
            }
            None => None,
        },
        None => None,
    };
    let tool_id = resolve_tool(block, discriminator.as_ref())?;

    let active = resolve_active_fields(block, &effective);
    let mut errors = Vec::new();
    let mut failed: AHashSet<&str> = AHashSet::new();

    for field in block.fields() {
        if !active.contains(&field.key) || coerced.contains_key(&field.key) {
            continue;
        }
        let Some(value) = effective.get(&field.key) else {
            continue;
        };
        match coerce(field, value) {
            Ok(value) => {
                coerced.insert(field.key.clone(), value);
            }
            Err(e) => {
                failed.insert(field.key.as_str());
                errors.push(ResolutionError::Coercion(e));
            }
        }
    }

    let parameters = merge_aliases(block, &active, &coerced);

    let fields = block.fields();
    for (output_key, members) in block.groups() {
        if parameters.contains_key(output_key) {
            continue;
        }
        let required: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| fields[i].required && active.contains(&fields[i].key))
            .collect();
        let already_reported = members.iter().any(|&i| failed.contains(fields[i].key.as_str()));
        if let Some(&first) = required.first() {
            if !already_reported {
                errors.push(ResolutionError::MissingRequiredField {
                    parameter: output_key.clone(),
                    display_name: fields[first].label().to_string(),
                    fields: required.iter().map(|&i| fields[i].key.clone()).collect(),
                });
            }
        }
    }

    if !errors.is_empty() {
        debug!(
            block = block.block_type(),
            errors = errors.len(),
            "block resolution rejected"
        );
        return Err(ResolutionErrors::new(errors));
    }

    debug!(
        block = block.block_type(),
        tool = %tool_id,
        parameters = parameters.len(),
        "block resolved"
    );
    Ok(ResolvedParameters {
        tool_id,
        parameters,
    })
}
