use serde_json::Value;

/// Render a run result for display.
///
/// Strings are shown verbatim, other values as pretty JSON, and an undefined
/// result as an empty string.
pub fn stringify_result(result: Option<&Value>) -> String {
    match result {
        None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
