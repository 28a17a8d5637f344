//! The JSON block file format: the declarative block definitions as authored, with
//! UI control kinds, `condition` objects and a `tools` section.

use super::conversion::IntoBlockSchema;
use super::definition::{
    BlockSchema, DefaultValue, FieldOption, FieldSchema, NumberKind, ValueType,
    VisibilityCondition,
};
use crate::error::SchemaError;
use crate::value::{Literal, RawValue};
use indexmap::IndexMap;
use serde::Deserialize;

/// The discriminator key assumed when a block maps operations but names no field.
const DEFAULT_OPERATION_FIELD: &str = "operation";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFile {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub name: Option<String>,
    pub sub_blocks: Vec<SubBlock>,
    pub tools: ToolsSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubBlock {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// UI control kind, e.g. `short-input`, `dropdown`, `switch`, `code`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub options: Vec<OptionEntry>,
    #[serde(default)]
    pub condition: Option<ConditionEntry>,
    #[serde(default)]
    pub canonical_param_id: Option<String>,
    #[serde(default)]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub number_kind: Option<NumberKind>,
    #[serde(default)]
    pub trim: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OptionEntry {
    Id(String),
    Labeled {
        id: String,
        #[serde(default)]
        label: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct ConditionEntry {
    pub field: String,
    pub value: ConditionValues,
    #[serde(default)]
    pub not: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ConditionValues {
    Many(Vec<Literal>),
    One(Literal),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsSection {
    #[serde(default)]
    pub access: Vec<String>,
    #[serde(default)]
    pub operation_field: Option<String>,
    #[serde(default)]
    pub operations: IndexMap<String, String>,
    #[serde(default)]
    pub fallback: Option<String>,
}

impl BlockFile {
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(text).map_err(|e| SchemaError::InvalidDefinition(e.to_string()))
    }
}

/// Maps a UI control kind to the value type its input carries.
pub fn value_type_for_kind(kind: &str) -> ValueType {
    match kind {
        "switch" | "checkbox" => ValueType::Boolean,
        "slider" => ValueType::Number,
        "code" | "table" | "json" => ValueType::Structured,
        _ => ValueType::String,
    }
}

impl IntoBlockSchema for BlockFile {
    fn into_block_schema(self) -> Result<BlockSchema, SchemaError> {
        let tools = self.tools;
        if !tools.access.is_empty() {
            let referenced = tools.operations.values().chain(tools.fallback.iter());
            if let Some(unknown) = referenced.into_iter().find(|t| !tools.access.contains(t)) {
                return Err(SchemaError::InvalidDefinition(format!(
                    "block '{}' routes to tool '{}', which is not in its access list",
                    self.block_type, unknown
                )));
            }
        }

        let fields: Vec<FieldSchema> = self.sub_blocks.into_iter().map(convert_sub_block).collect();

        let operation_field = tools.operation_field.or_else(|| {
            (!tools.operations.is_empty()
                && fields.iter().any(|f| f.key == DEFAULT_OPERATION_FIELD))
            .then(|| DEFAULT_OPERATION_FIELD.to_string())
        });

        let tool = match (&operation_field, tools.access.as_slice()) {
            (None, [only]) => Some(only.clone()),
            _ => None,
        };

        Ok(BlockSchema {
            block_type: self.block_type,
            fields,
            operation_field,
            operation_to_tool: tools.operations,
            tool,
            fallback_tool: tools.fallback,
        })
    }
}

fn convert_sub_block(sub: SubBlock) -> FieldSchema {
    let value_type = sub
        .value_type
        .unwrap_or_else(|| value_type_for_kind(&sub.kind));

    let visibility_condition = sub.condition.map(|c| VisibilityCondition {
        on_field: c.field,
        matches_any_of: match c.value {
            ConditionValues::Many(values) => values,
            ConditionValues::One(value) => vec![value],
        },
        negate: c.not,
    });

    let options = sub
        .options
        .into_iter()
        .map(|entry| match entry {
            OptionEntry::Id(id) => FieldOption::new(&id, &id),
            OptionEntry::Labeled { id, label } => {
                let label = label.unwrap_or_else(|| id.clone());
                FieldOption { id, label }
            }
        })
        .collect();

    FieldSchema {
        key: sub.id,
        display_name: sub.title,
        value_type,
        number_kind: sub.number_kind.unwrap_or_default(),
        required: sub.required,
        default_value: sub
            .default_value
            .map(|v| DefaultValue::Static(RawValue::from(v))),
        visibility_condition,
        canonical_key: sub.canonical_param_id,
        options,
        trim: sub.trim,
    }
}
