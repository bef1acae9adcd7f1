//! Form field and run result types shared by the engine, TUI, and CLI.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PropertySchema;

/// String literal stored in a checked boolean field.
pub const BOOLEAN_TRUE: &str = "True";
/// String literal stored in an unchecked boolean field.
pub const BOOLEAN_FALSE: &str = "False";

/// Control kind derived from a property's type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Checkbox storing `"True"` / `"False"`.
    Boolean,
    /// Numeric input accepting fractions.
    Number,
    /// Numeric input accepting whole numbers.
    Integer,
    /// Multi-line JSON text.
    Object,
    /// Select over declared options.
    Enum,
    /// Single-line text; also the fallback for unknown tags.
    Text,
}

impl FieldKind {
    /// Number of text rows used when rendering an object field.
    pub const OBJECT_ROWS: u16 = 4;

    /// Dispatch on the property type tag.
    ///
    /// A non-empty `enum` list wins over the type tag since JSON schema
    /// usually pairs `enum` with `"type": "string"`.
    pub fn from_property(property: &PropertySchema) -> Self {
        if !property.enum_values.is_empty() {
            return FieldKind::Enum;
        }
        match property.r#type.as_deref() {
            Some("boolean") => FieldKind::Boolean,
            Some("number") => FieldKind::Number,
            Some("integer") => FieldKind::Integer,
            Some("object") | Some("array") => FieldKind::Object,
            Some("enum") => FieldKind::Enum,
            Some("string") | Some(_) | None => FieldKind::Text,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Integer)
    }
}

/// One schema property plus its current user-supplied value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Dotted path of the property (e.g. `"address.city"`).
    pub name: String,
    /// Group heading rendered above this entry, if any.
    pub title: Option<String>,
    pub required: bool,
    /// String-encoded current value.
    pub value: String,
    pub kind: FieldKind,
    /// Originating property descriptor.
    pub property: PropertySchema,
    /// Selectable options for enum fields.
    pub options: Vec<String>,
}

impl FormField {
    /// Nesting depth inferred from the dotted name; used for indentation only.
    pub fn depth(&self) -> usize {
        self.name.split('.').count().saturating_sub(1)
    }

    /// Control label: property title (or the last name segment) plus `" *"` when required.
    pub fn label(&self) -> String {
        let base = self
            .property
            .title
            .clone()
            .unwrap_or_else(|| self.name.rsplit('.').next().unwrap_or(&self.name).to_string());
        if self.required { format!("{base} *") } else { base }
    }

    pub fn description(&self) -> Option<&str> {
        self.property.description.as_deref().filter(|text| !text.trim().is_empty())
    }

    pub fn is_checked(&self) -> bool {
        self.value == BOOLEAN_TRUE
    }
}

/// Outcome of the most recent run request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RunState {
    #[default]
    Idle,
    Pending,
    /// Success value; `None` when the server returned nothing.
    Succeeded(Option<Value>),
    Failed(String),
}

impl RunState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RunState::Pending)
    }

    /// Whether a result panel should be shown for this state.
    pub fn has_displayable_result(&self) -> bool {
        match self {
            RunState::Succeeded(data) => data.is_some(),
            RunState::Failed(message) => !message.is_empty(),
            RunState::Idle | RunState::Pending => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn property(type_tag: Option<&str>) -> PropertySchema {
        PropertySchema {
            r#type: type_tag.map(str::to_string),
            ..PropertySchema::default()
        }
    }

    #[test]
    fn kind_dispatch_covers_known_tags_and_falls_back_to_text() {
        assert_eq!(FieldKind::from_property(&property(Some("boolean"))), FieldKind::Boolean);
        assert_eq!(FieldKind::from_property(&property(Some("number"))), FieldKind::Number);
        assert_eq!(FieldKind::from_property(&property(Some("integer"))), FieldKind::Integer);
        assert_eq!(FieldKind::from_property(&property(Some("object"))), FieldKind::Object);
        assert_eq!(FieldKind::from_property(&property(Some("array"))), FieldKind::Object);
        assert_eq!(FieldKind::from_property(&property(Some("enum"))), FieldKind::Enum);
        assert_eq!(FieldKind::from_property(&property(Some("string"))), FieldKind::Text);
        assert_eq!(FieldKind::from_property(&property(Some("uuid"))), FieldKind::Text);
        assert_eq!(FieldKind::from_property(&property(None)), FieldKind::Text);
    }

    #[test]
    fn enum_values_take_precedence_over_type_tag() {
        let mut schema = property(Some("string"));
        schema.enum_values = vec![json!("low"), json!("high")];
        assert_eq!(FieldKind::from_property(&schema), FieldKind::Enum);
    }

    #[test]
    fn label_and_depth_follow_dotted_name() {
        let field = FormField {
            name: "address.city".into(),
            title: None,
            required: true,
            value: String::new(),
            kind: FieldKind::Text,
            property: PropertySchema::default(),
            options: Vec::new(),
        };
        assert_eq!(field.depth(), 1);
        assert_eq!(field.label(), "city *");
    }

    #[test]
    fn only_defined_success_or_error_is_displayable() {
        assert!(!RunState::Idle.has_displayable_result());
        assert!(!RunState::Pending.has_displayable_result());
        assert!(!RunState::Succeeded(None).has_displayable_result());
        assert!(RunState::Succeeded(Some(json!(0))).has_displayable_result());
        assert!(RunState::Failed("boom".into()).has_displayable_result());
    }
}
