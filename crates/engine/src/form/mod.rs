//! Owned form state for one action and the pure field editor.

mod builder;
mod payload;

pub use builder::build_form_fields;
pub use payload::{PayloadError, form_fields_to_payload};

use actrun_types::{Action, ActionPackage, FormField, InputSchema, RunState, SchemaError};
use serde_json::Value;
use tracing::debug;

/// Form built for a single action, plus the result of its latest run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionForm {
    pub package_name: String,
    pub action_name: String,
    pub fields: Vec<FormField>,
    pub result: RunState,
}

impl ActionForm {
    /// Build a fresh form for `action`, discarding any earlier edits.
    pub fn new(package: &ActionPackage, action: &Action) -> Result<Self, SchemaError> {
        let schema = action.parse_input_schema()?;
        Ok(Self::from_schema(&package.name, &action.name, &schema))
    }

    pub fn from_schema(package_name: &str, action_name: &str, schema: &InputSchema) -> Self {
        let fields = build_form_fields(schema);
        debug!(package = package_name, action = action_name, fields = fields.len(), "built action form");
        Self {
            package_name: package_name.to_string(),
            action_name: action_name.to_string(),
            fields,
            result: RunState::Idle,
        }
    }

    /// Return a form where field `index` holds `value`.
    ///
    /// All other entries keep their values and any previous result is cleared
    /// to idle. An out-of-range index leaves the fields untouched.
    pub fn edit(&self, index: usize, value: impl Into<String>) -> Self {
        let value = value.into();
        let fields = self
            .fields
            .iter()
            .enumerate()
            .map(|(position, field)| {
                if position == index {
                    FormField {
                        value: value.clone(),
                        ..field.clone()
                    }
                } else {
                    field.clone()
                }
            })
            .collect();
        Self {
            package_name: self.package_name.clone(),
            action_name: self.action_name.clone(),
            fields,
            result: RunState::Idle,
        }
    }

    /// Return a form with `result` as the run state.
    pub fn with_result(self, result: RunState) -> Self {
        Self { result, ..self }
    }

    pub fn set_result(&mut self, result: RunState) {
        self.result = result;
    }

    /// Whether a run is in flight; advisory only.
    pub fn is_busy(&self) -> bool {
        self.result.is_pending()
    }

    /// Both identifiers needed to issue a run are present.
    pub fn is_submittable(&self) -> bool {
        !self.package_name.trim().is_empty() && !self.action_name.trim().is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&FormField> {
        self.fields.get(index)
    }

    /// Typed request payload derived from the current values.
    pub fn payload(&self) -> Result<Value, PayloadError> {
        form_fields_to_payload(&self.fields)
    }
}
