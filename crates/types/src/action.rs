//! Action catalog types as reported by the action server.
//!
//! An [`Action`] carries its input schema as a JSON-encoded string. The
//! schema is decoded lazily through [`Action::parse_input_schema`] so that a
//! malformed schema only affects the form built for that action.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A remotely invokable operation with a declared input schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action name as declared by its package (e.g. `"Create Ticket"`).
    pub name: String,
    /// JSON-encoded object schema describing the action inputs.
    #[serde(default)]
    pub input_schema: String,
    /// Optional human-readable documentation.
    #[serde(default)]
    pub docs: Option<String>,
}

impl Action {
    /// Decode the JSON-encoded input schema.
    ///
    /// An empty schema string is treated as an object without properties.
    pub fn parse_input_schema(&self) -> Result<InputSchema, SchemaError> {
        InputSchema::from_json_str(&self.input_schema)
    }
}

/// A named grouping of related actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPackage {
    pub name: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl ActionPackage {
    pub fn find_action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.name == name)
    }
}

/// Server-level settings exposed by the action server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Whether run requests must carry an API key.
    #[serde(default)]
    pub auth_enabled: bool,
}

/// Top-level object schema of an action's inputs.
///
/// Property order is preserved as declared in the source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(default)]
    pub properties: IndexMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl InputSchema {
    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw).map_err(|error| SchemaError::Malformed(error.to_string()))
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|required| required == name)
    }
}

/// Descriptor of a single named input property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Type tag (`boolean`, `number`, `integer`, `object`, `enum`, `string`, ...).
    #[serde(default, rename = "type")]
    pub r#type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    /// Allowed values for enumerations.
    #[serde(default, rename = "enum")]
    pub enum_values: Vec<Value>,
    /// Nested properties of an object-typed property.
    #[serde(default)]
    pub properties: IndexMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("input schema is not valid JSON: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_schema_preserves_declared_property_order() {
        let action = Action {
            name: "greet".into(),
            input_schema: r#"{
                "properties": {
                    "zeta": {"type": "string"},
                    "alpha": {"type": "integer"},
                    "mid": {"type": "boolean"}
                },
                "required": ["alpha"]
            }"#
            .into(),
            docs: None,
        };

        let schema = action.parse_input_schema().expect("schema parses");
        let names: Vec<_> = schema.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(schema.is_required("alpha"));
        assert!(!schema.is_required("zeta"));
    }

    #[test]
    fn empty_schema_string_yields_no_properties() {
        let action = Action::default();
        let schema = action.parse_input_schema().expect("empty schema parses");
        assert!(schema.properties.is_empty());
    }

    #[test]
    fn malformed_schema_is_reported() {
        let action = Action {
            name: "broken".into(),
            input_schema: "{not json".into(),
            docs: None,
        };
        assert!(matches!(action.parse_input_schema(), Err(SchemaError::Malformed(_))));
    }

    #[test]
    fn property_schema_reads_enum_and_type_keywords() {
        let property: PropertySchema = serde_json::from_str(
            r#"{"type": "string", "enum": ["a", "b"], "title": "Choice", "x-extra": 1}"#,
        )
        .expect("property parses");
        assert_eq!(property.r#type.as_deref(), Some("string"));
        assert_eq!(property.enum_values.len(), 2);
        assert_eq!(property.title.as_deref(), Some("Choice"));
        assert!(property.description.is_none());
    }

    #[test]
    fn server_config_defaults_to_auth_disabled() {
        let config: ServerConfig = serde_json::from_str("{}").expect("config parses");
        assert!(!config.auth_enabled);
    }
}
