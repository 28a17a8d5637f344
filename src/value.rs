use ahash::AHashMap;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The untyped values submitted for a block, keyed by field key or canonical key.
pub type RawInputMap = AHashMap<String, RawValue>;

/// A value as it arrives from the UI or from a programmatic caller.
///
/// Users type text, so most values are `Text`. Callers that already hold typed data
/// (an upstream block's output, a test fixture) may pass numbers, booleans or whole
/// structured documents instead. JSON integers stay `Structured` so they keep their
/// full precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Structured(serde_json::Value),
}

impl RawValue {
    /// Whether this value carries nothing usable: blank text, `null` or an empty array.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Structured(v) => json_is_blank(v),
            RawValue::Bool(_) | RawValue::Number(_) => false,
        }
    }

    /// The literal form used when matching visibility conditions and discriminators.
    pub fn as_literal(&self) -> Option<Literal> {
        match self {
            RawValue::Text(s) => Some(Literal::Text(s.clone())),
            RawValue::Number(n) => Some(Literal::Number(*n)),
            RawValue::Bool(b) => Some(Literal::Bool(*b)),
            RawValue::Structured(v) => Literal::from_json(v),
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => RawValue::Text(s),
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) if n.is_f64() => RawValue::Number(f),
                _ => RawValue::Structured(serde_json::Value::Number(n)),
            },
            other => RawValue::Structured(other),
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(RawValue::from)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

/// Builds a [`RawInputMap`] from a JSON object. Non-object documents yield an empty map.
pub fn raw_inputs_from_json(document: serde_json::Value) -> RawInputMap {
    match document {
        serde_json::Value::Object(map) => map.into_iter().map(|(k, v)| (k, v.into())).collect(),
        _ => RawInputMap::new(),
    }
}

/// A primitive value used in visibility conditions and operation lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Literal {
    pub fn from_json(value: &serde_json::Value) -> Option<Literal> {
        match value {
            serde_json::Value::String(s) => Some(Literal::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(Literal::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Literal::Number),
            _ => None,
        }
    }

    /// Equality on primitives, read the way coercion reads text: surrounding whitespace
    /// is ignored, text matches a number by numeric value (`"5.0"` matches `5`) and a
    /// boolean in any case (`"True"` matches `true`).
    pub fn matches(&self, other: &Literal) -> bool {
        match (self, other) {
            (Literal::Text(a), Literal::Text(b)) => a.trim() == b.trim(),
            (Literal::Number(a), Literal::Number(b)) => a == b,
            (Literal::Bool(a), Literal::Bool(b)) => a == b,
            (Literal::Text(text), Literal::Number(n)) | (Literal::Number(n), Literal::Text(text)) => {
                text.trim().parse::<f64>().is_ok_and(|parsed| parsed == *n)
            }
            (Literal::Text(text), Literal::Bool(b)) | (Literal::Bool(b), Literal::Text(text)) => {
                text.trim().eq_ignore_ascii_case(if *b { "true" } else { "false" })
            }
            _ => false,
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Text(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(s) => write!(f, "{}", s),
            Literal::Number(n) => write!(f, "{}", format_number(*n)),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A typed parameter value, produced by coercion and handed to the tool invoker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Structured(serde_json::Value),
}

impl Value {
    /// Whether this value fails the "non-empty" test used by alias merging and
    /// required-field checks.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Text(s) => s.trim().is_empty(),
            Value::Structured(v) => json_is_blank(v),
            Value::Integer(_) | Value::Float(_) | Value::Bool(_) => false,
        }
    }

    /// The key used to look this value up in an operation-to-tool table.
    pub fn lookup_key(&self) -> String {
        match self {
            Value::Text(s) => s.trim().to_string(),
            other => other.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Structured(v) => v.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", format_number(*n)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Structured(v) => write!(f, "{}", v),
        }
    }
}

fn json_is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
