//! String-encoded field values to a typed JSON payload.

use actrun_types::{BOOLEAN_TRUE, FieldKind, FormField};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// A field value that cannot be converted to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Field '{field}' expects an integer, got '{value}'")]
    InvalidInteger { field: String, value: String },
    #[error("Field '{field}' expects a number, got '{value}'")]
    InvalidNumber { field: String, value: String },
    #[error("Field '{field}' is not valid JSON: {error}")]
    InvalidJson { field: String, error: String },
}

/// Map each field to its typed value and nest dotted names into objects.
///
/// Empty numeric and object fields are omitted; text and enum values are
/// always sent verbatim.
pub fn form_fields_to_payload(fields: &[FormField]) -> Result<Value, PayloadError> {
    let mut root = Map::new();
    for field in fields {
        if let Some(value) = typed_value(field)? {
            insert_dotted(&mut root, &field.name, value);
        }
    }
    Ok(Value::Object(root))
}

fn typed_value(field: &FormField) -> Result<Option<Value>, PayloadError> {
    let raw = field.value.trim();
    match field.kind {
        FieldKind::Boolean => Ok(Some(Value::Bool(field.value == BOOLEAN_TRUE))),
        FieldKind::Integer => {
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<i64>()
                .map(|number| Some(Value::Number(number.into())))
                .map_err(|_| PayloadError::InvalidInteger {
                    field: field.name.clone(),
                    value: field.value.clone(),
                })
        }
        FieldKind::Number => {
            if raw.is_empty() {
                return Ok(None);
            }
            if let Ok(whole) = raw.parse::<i64>() {
                return Ok(Some(Value::Number(whole.into())));
            }
            raw.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(|number| Some(Value::Number(number)))
                .ok_or_else(|| PayloadError::InvalidNumber {
                    field: field.name.clone(),
                    value: field.value.clone(),
                })
        }
        FieldKind::Object => {
            if raw.is_empty() {
                return Ok(None);
            }
            serde_json::from_str(raw).map(Some).map_err(|error| PayloadError::InvalidJson {
                field: field.name.clone(),
                error: error.to_string(),
            })
        }
        FieldKind::Enum | FieldKind::Text => Ok(Some(Value::String(field.value.clone()))),
    }
}

fn insert_dotted(root: &mut Map<String, Value>, name: &str, value: Value) {
    let mut segments: Vec<&str> = name.split('.').collect();
    let Some(leaf) = segments.pop() else { return };

    let mut current = root;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else { return };
        current = next;
    }
    current.insert(leaf.to_string(), value);
}
