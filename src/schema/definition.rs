use crate::value::{Literal, RawInputMap, RawValue};
use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::ser::{Error as _, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The type a field's raw value is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Number,
    Boolean,
    /// A JSON-shaped value, typed as text in the UI.
    Structured,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::Number => write!(f, "number"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Structured => write!(f, "structured"),
        }
    }
}

/// Sub-type of [`ValueType::Number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    Integer,
    #[default]
    Float,
}

/// A field is active only while `on_field` holds one of `matches_any_of` (or, when
/// negated, while it holds none of them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityCondition {
    #[serde(alias = "onField")]
    pub on_field: String,
    #[serde(alias = "matchesAnyOf")]
    pub matches_any_of: Vec<Literal>,
    #[serde(default)]
    pub negate: bool,
}

impl VisibilityCondition {
    pub fn new<I, L>(on_field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        Self {
            on_field: on_field.to_string(),
            matches_any_of: values.into_iter().map(Into::into).collect(),
            negate: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }
}

/// A function producing a default from the raw inputs of the current request.
pub type DefaultFn = dyn Fn(&RawInputMap) -> Option<RawValue> + Send + Sync;

/// The value a field takes when the caller supplies nothing usable.
#[derive(Clone)]
pub enum DefaultValue {
    Static(RawValue),
    Computed(Arc<DefaultFn>),
}

impl DefaultValue {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&RawInputMap) -> Option<RawValue> + Send + Sync + 'static,
    {
        DefaultValue::Computed(Arc::new(f))
    }

    pub fn produce(&self, raw: &RawInputMap) -> Option<RawValue> {
        match self {
            DefaultValue::Static(value) => Some(value.clone()),
            DefaultValue::Computed(f) => f(raw),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            DefaultValue::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

impl Serialize for DefaultValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DefaultValue::Static(value) => value.serialize(serializer),
            DefaultValue::Computed(_) => Err(S::Error::custom(
                "computed default values cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for DefaultValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawValue::deserialize(deserializer).map(DefaultValue::Static)
    }
}

/// One selectable choice of a dropdown-like field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

impl FieldOption {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

/// One configurable field of a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub key: String,
    #[serde(default, alias = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, alias = "valueType")]
    pub value_type: ValueType,
    #[serde(default, alias = "numberKind")]
    pub number_kind: NumberKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, alias = "defaultValue", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    #[serde(
        default,
        alias = "visibilityCondition",
        skip_serializing_if = "Option::is_none"
    )]
    pub visibility_condition: Option<VisibilityCondition>,
    #[serde(default, alias = "canonicalKey", skip_serializing_if = "Option::is_none")]
    pub canonical_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Transport string values trimmed.
    #[serde(default)]
    pub trim: bool,
}

impl FieldSchema {
    pub fn new(key: &str, value_type: ValueType) -> Self {
        Self {
            key: key.to_string(),
            display_name: None,
            value_type,
            number_kind: NumberKind::default(),
            required: false,
            default_value: None,
            visibility_condition: None,
            canonical_key: None,
            options: Vec::new(),
            trim: false,
        }
    }

    pub fn string(key: &str) -> Self {
        Self::new(key, ValueType::String)
    }

    pub fn number(key: &str) -> Self {
        Self::new(key, ValueType::Number)
    }

    pub fn boolean(key: &str) -> Self {
        Self::new(key, ValueType::Boolean)
    }

    pub fn structured(key: &str) -> Self {
        Self::new(key, ValueType::Structured)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn integer(mut self) -> Self {
        self.number_kind = NumberKind::Integer;
        self
    }

    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    pub fn with_default(mut self, value: impl Into<RawValue>) -> Self {
        self.default_value = Some(DefaultValue::Static(value.into()));
        self
    }

    pub fn with_computed_default<F>(mut self, f: F) -> Self
    where
        F: Fn(&RawInputMap) -> Option<RawValue> + Send + Sync + 'static,
    {
        self.default_value = Some(DefaultValue::computed(f));
        self
    }

    pub fn with_condition(mut self, condition: VisibilityCondition) -> Self {
        self.visibility_condition = Some(condition);
        self
    }

    /// Shorthand for a condition matching any of `values` on `on_field`.
    pub fn visible_when<I, L>(self, on_field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        self.with_condition(VisibilityCondition::new(on_field, values))
    }

    /// Shorthand for a negated condition: hidden while `on_field` matches `values`.
    pub fn hidden_when<I, L>(self, on_field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        self.with_condition(VisibilityCondition::new(on_field, values).negated())
    }

    pub fn with_canonical_key(mut self, canonical_key: &str) -> Self {
        self.canonical_key = Some(canonical_key.to_string());
        self
    }

    pub fn with_options<'a>(mut self, options: impl IntoIterator<Item = &'a str>) -> Self {
        self.options = options
            .into_iter()
            .map(|id| FieldOption::new(id, id))
            .collect();
        self
    }

    /// The label used in messages: the display name, or the key when there is none.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.key)
    }

    /// The output parameter this field feeds.
    pub fn output_key(&self) -> &str {
        self.canonical_key.as_deref().unwrap_or(&self.key)
    }
}

/// The declarative definition of one block: its fields and how they select a tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockSchema {
    #[serde(alias = "blockType")]
    pub block_type: String,
    pub fields: Vec<FieldSchema>,
    #[serde(default, alias = "operationField", skip_serializing_if = "Option::is_none")]
    pub operation_field: Option<String>,
    #[serde(default, alias = "operationToTool", skip_serializing_if = "IndexMap::is_empty")]
    pub operation_to_tool: IndexMap<String, String>,
    /// The tool invoked when the block has no operation field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// The tool invoked for an unknown or missing operation, if the block declares one.
    #[serde(default, alias = "fallbackTool", skip_serializing_if = "Option::is_none")]
    pub fallback_tool: Option<String>,
}

impl BlockSchema {
    pub fn new(block_type: &str) -> Self {
        Self {
            block_type: block_type.to_string(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_tool(mut self, tool: &str) -> Self {
        self.tool = Some(tool.to_string());
        self
    }

    pub fn with_operation<'a>(
        mut self,
        field: &str,
        mapping: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.operation_field = Some(field.to_string());
        self.operation_to_tool = mapping
            .into_iter()
            .map(|(value, tool)| (value.to_string(), tool.to_string()))
            .collect();
        self
    }

    pub fn with_fallback_tool(mut self, tool: &str) -> Self {
        self.fallback_tool = Some(tool.to_string());
        self
    }

    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }
}
