//! Field values supplied on the command line or in an inputs file.

use actrun_types::{BOOLEAN_FALSE, BOOLEAN_TRUE, FieldKind, FormField};
use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;

/// Parse a `name=value` assignment given with `-i`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Read a YAML (or JSON) mapping of field names to values.
///
/// Strings are used verbatim; other scalars use their JSON text and nested
/// structures become JSON for object fields.
pub fn parse_inputs_document(text: &str) -> Result<Vec<(String, String)>> {
    let document: serde_yaml::Value = serde_yaml::from_str(text).context("inputs file is not valid YAML or JSON")?;
    let serde_yaml::Value::Mapping(entries) = document else {
        bail!("inputs file must contain a mapping of field names to values");
    };
    entries
        .into_iter()
        .map(|(name, value)| {
            let name = name
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("inputs file keys must be field names"))?;
            let text = match serde_json::to_value(&value).with_context(|| format!("convert value of '{name}'"))? {
                Value::String(text) => text,
                Value::Null => String::new(),
                structured @ (Value::Array(_) | Value::Object(_)) => serde_json::to_string_pretty(&structured)?,
                scalar => scalar.to_string(),
            };
            Ok((name, text))
        })
        .collect()
}

/// Translate a command-line value into the string a field stores.
///
/// Checkbox fields accept the usual spellings of true and false.
pub fn field_value(field: &FormField, raw: &str) -> Result<String> {
    if field.kind != FieldKind::Boolean {
        return Ok(raw.to_string());
    }
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(BOOLEAN_TRUE.to_string()),
        "false" | "no" | "off" | "0" | "" => Ok(BOOLEAN_FALSE.to_string()),
        _ => Err(anyhow!("Field '{}' expects true or false, got '{raw}'", field.name)),
    }
}
