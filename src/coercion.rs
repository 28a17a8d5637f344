//! Conversion of raw form values into the types a block's tools expect.
//!
//! | Declared type | Accepted raw values | Result |
//! |---|---|---|
//! | string | text, number, boolean, structured string | `Value::Text` |
//! | number | numeric text, finite number | `Value::Integer` or `Value::Float` per [`NumberKind`] |
//! | boolean | boolean, `"true"`/`"false"` in any case | `Value::Bool` |
//! | structured | JSON text, any structured value, number, boolean | `Value::Structured` |
//!
//! Everything else is a [`CoercionError`] naming the field. Coercion is pure: the same
//! field and raw value always give the same result.

use crate::error::CoercionError;
use crate::schema::{FieldSchema, NumberKind, ValueType};
use crate::value::{Literal, RawValue, Value};

/// Coerces one raw value to the field's declared type.
pub fn coerce(field: &FieldSchema, raw: &RawValue) -> Result<Value, CoercionError> {
    match field.value_type {
        ValueType::String => coerce_string(field, raw),
        ValueType::Number => coerce_number(field, raw),
        ValueType::Boolean => coerce_boolean(field, raw),
        ValueType::Structured => coerce_structured(field, raw),
    }
}

fn coerce_string(field: &FieldSchema, raw: &RawValue) -> Result<Value, CoercionError> {
    let text = match raw {
        RawValue::Text(s) => s.clone(),
        RawValue::Number(n) => Literal::Number(*n).to_string(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Structured(serde_json::Value::String(s)) => s.clone(),
        RawValue::Structured(serde_json::Value::Number(n)) => n.to_string(),
        RawValue::Structured(_) => {
            return Err(failure(field, "expected text, got a structured value"));
        }
    };
    if field.trim {
        Ok(Value::Text(text.trim().to_string()))
    } else {
        Ok(Value::Text(text))
    }
}

fn coerce_number(field: &FieldSchema, raw: &RawValue) -> Result<Value, CoercionError> {
    match raw {
        RawValue::Text(s) => parse_number(field, s),
        RawValue::Number(n) => number_value(field, *n, &Literal::Number(*n).to_string()),
        RawValue::Structured(serde_json::Value::String(s)) => parse_number(field, s),
        RawValue::Structured(serde_json::Value::Number(n)) => match field.number_kind {
            NumberKind::Integer => n
                .as_i64()
                .map(Value::Integer)
                .ok_or_else(|| failure(field, format!("'{}' is not a valid integer", n))),
            NumberKind::Float => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| failure(field, format!("'{}' is not a valid number", n))),
        },
        RawValue::Bool(b) => Err(failure(field, format!("expected a number, got '{}'", b))),
        RawValue::Structured(_) => Err(failure(field, "expected a number, got a structured value")),
    }
}

fn parse_number(field: &FieldSchema, text: &str) -> Result<Value, CoercionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(failure(field, "expected a number, got an empty value"));
    }
    if field.number_kind == NumberKind::Integer {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Ok(Value::Integer(i));
        }
    }
    match trimmed.parse::<f64>() {
        Ok(n) => number_value(field, n, trimmed),
        Err(_) => Err(failure(field, not_a_number(field, trimmed))),
    }
}

fn number_value(field: &FieldSchema, n: f64, shown: &str) -> Result<Value, CoercionError> {
    if !n.is_finite() {
        return Err(failure(field, not_a_number(field, shown)));
    }
    match field.number_kind {
        NumberKind::Float => Ok(Value::Float(n)),
        NumberKind::Integer if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
            Ok(Value::Integer(n as i64))
        }
        NumberKind::Integer => Err(failure(field, not_a_number(field, shown))),
    }
}

fn not_a_number(field: &FieldSchema, shown: &str) -> String {
    match field.number_kind {
        NumberKind::Integer => format!("'{}' is not a valid integer", shown),
        NumberKind::Float => format!("'{}' is not a valid number", shown),
    }
}

fn coerce_boolean(field: &FieldSchema, raw: &RawValue) -> Result<Value, CoercionError> {
    match raw {
        RawValue::Bool(b) | RawValue::Structured(serde_json::Value::Bool(b)) => Ok(Value::Bool(*b)),
        RawValue::Text(s) | RawValue::Structured(serde_json::Value::String(s)) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(failure(
                    field,
                    format!("'{}' is not a boolean (expected true or false)", s.trim()),
                )),
            }
        }
        RawValue::Number(n) => Err(failure(
            field,
            format!("expected true or false, got '{}'", Literal::Number(*n)),
        )),
        RawValue::Structured(serde_json::Value::Number(n)) => Err(failure(
            field,
            format!("expected true or false, got '{}'", n),
        )),
        RawValue::Structured(_) => Err(failure(field, "expected true or false, got a structured value")),
    }
}

fn coerce_structured(field: &FieldSchema, raw: &RawValue) -> Result<Value, CoercionError> {
    match raw {
        RawValue::Text(s) => serde_json::from_str::<serde_json::Value>(s)
            .map(Value::Structured)
            .map_err(|e| failure(field, format!("invalid JSON: {}", e))),
        RawValue::Structured(v) => Ok(Value::Structured(v.clone())),
        RawValue::Bool(b) => Ok(Value::Structured(serde_json::Value::Bool(*b))),
        RawValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(|n| Value::Structured(serde_json::Value::Number(n)))
            .ok_or_else(|| failure(field, format!("'{}' is not a valid number", n))),
    }
}

fn failure(field: &FieldSchema, message: impl Into<String>) -> CoercionError {
    CoercionError {
        field: field.key.clone(),
        display_name: field.label().to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_keeps_whitespace_unless_trimmed() {
        let plain = FieldSchema::string("name");
        let trimmed = FieldSchema::string("name").trimmed();
        let raw = RawValue::from("  Bob ");
        assert_eq!(coerce(&plain, &raw).unwrap(), Value::Text("  Bob ".to_string()));
        assert_eq!(coerce(&trimmed, &raw).unwrap(), Value::Text("Bob".to_string()));
    }

    #[test]
    fn test_number_to_string() {
        let field = FieldSchema::string("id");
        assert_eq!(coerce(&field, &RawValue::Number(42.0)).unwrap(), Value::Text("42".into()));
    }

    #[test]
    fn test_json_integers_keep_precision() {
        let raw = RawValue::from(json!(9007199254740993u64));
        assert_eq!(
            coerce(&FieldSchema::number("id").integer(), &raw).unwrap(),
            Value::Integer(9007199254740993)
        );
        assert_eq!(
            coerce(&FieldSchema::string("id"), &raw).unwrap(),
            Value::Text("9007199254740993".into())
        );
        assert!(coerce(&FieldSchema::boolean("id"), &raw).is_err());
    }

    #[test]
    fn test_integer_and_float_parsing() {
        let int_field = FieldSchema::number("limit").integer();
        let float_field = FieldSchema::number("temperature");
        assert_eq!(coerce(&int_field, &"25".into()).unwrap(), Value::Integer(25));
        assert_eq!(coerce(&int_field, &" 7.0 ".into()).unwrap(), Value::Integer(7));
        assert_eq!(coerce(&float_field, &"0.7".into()).unwrap(), Value::Float(0.7));
        assert!(coerce(&int_field, &"7.5".into()).is_err());
    }

    #[test]
    fn test_number_rejects_empty_and_non_numeric() {
        let field = FieldSchema::number("limit").with_display_name("Limit");
        let empty = coerce(&field, &"".into()).unwrap_err();
        assert_eq!(empty.field, "limit");
        assert!(empty.to_string().starts_with("Limit:"));
        assert!(coerce(&field, &"ten".into()).is_err());
        assert!(coerce(&field, &"NaN".into()).is_err());
        assert!(coerce(&field, &RawValue::Bool(true)).is_err());
    }

    #[test]
    fn test_boolean_accepts_native_and_case_insensitive_text() {
        let field = FieldSchema::boolean("includeSpam");
        assert_eq!(coerce(&field, &RawValue::Bool(false)).unwrap(), Value::Bool(false));
        assert_eq!(coerce(&field, &"TRUE".into()).unwrap(), Value::Bool(true));
        assert_eq!(coerce(&field, &"False".into()).unwrap(), Value::Bool(false));
        assert!(coerce(&field, &"yes".into()).is_err());
        assert!(coerce(&field, &RawValue::Number(1.0)).is_err());
    }

    #[test]
    fn test_structured_parses_text_and_passes_values_through() {
        let field = FieldSchema::structured("filter").with_display_name("Filter");
        let parsed = coerce(&field, &r#"{"status": "open", "ids": [1, 2]}"#.into()).unwrap();
        assert_eq!(parsed, Value::Structured(json!({"status": "open", "ids": [1, 2]})));

        let direct = RawValue::Structured(json!([{"a": 1}]));
        assert_eq!(coerce(&field, &direct).unwrap(), Value::Structured(json!([{"a": 1}])));
    }

    #[test]
    fn test_structured_error_names_field_and_parser_message() {
        let field = FieldSchema::structured("filter").with_display_name("Filter");
        let err = coerce(&field, &"{not json".into()).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Filter:"));
        assert!(message.contains("invalid JSON"));
        assert!(message.contains("line 1"));
    }

    #[test]
    fn test_coercion_is_idempotent() {
        let field = FieldSchema::number("limit").integer();
        let raw = RawValue::from("12");
        assert_eq!(coerce(&field, &raw), coerce(&field, &raw));
    }
}
