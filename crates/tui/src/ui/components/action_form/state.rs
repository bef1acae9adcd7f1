use actrun_engine::ActionForm;
use actrun_types::{Action, ActionPackage, BOOLEAN_FALSE, BOOLEAN_TRUE, FieldKind, FormField, RunState, SchemaError};
use actrun_util::{stringify_result, to_kebab_case};

use crate::ui::components::common::TextInputState;

/// Text shown in the result panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedResult {
    pub text: String,
    pub is_error: bool,
}

/// Form for the selected action plus the buffers backing its text controls.
///
/// Every keystroke in a text-like control is committed back through
/// [`ActionForm::edit`], so the buffer and the field value never diverge.
#[derive(Debug, Default)]
pub struct ActionFormState {
    form: Option<ActionForm>,
    docs: Option<String>,
    /// Buffer for the focused text, numeric, or object field.
    pub editor: TextInputState,
    pub api_key: TextInputState,
    pub load_error: Option<String>,
}

impl ActionFormState {
    /// Build a fresh form for `action`; previous edits and results are discarded.
    pub fn load(&mut self, package: &ActionPackage, action: &Action) -> Result<(), SchemaError> {
        self.editor = TextInputState::default();
        match ActionForm::new(package, action) {
            Ok(form) => {
                self.form = Some(form);
                self.docs = action.docs.clone().filter(|docs| !docs.trim().is_empty());
                self.load_error = None;
                Ok(())
            }
            Err(error) => {
                self.form = None;
                self.docs = None;
                self.load_error = Some(format!("{}: {error}", action.name));
                Err(error)
            }
        }
    }

    pub fn form(&self) -> Option<&ActionForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut ActionForm> {
        self.form.as_mut()
    }

    pub fn docs(&self) -> Option<&str> {
        self.docs.as_deref()
    }

    pub fn field_count(&self) -> usize {
        self.form.as_ref().map(|form| form.fields.len()).unwrap_or(0)
    }

    pub fn field(&self, index: usize) -> Option<&FormField> {
        self.form.as_ref()?.field(index)
    }

    fn edit(&mut self, index: usize, value: impl Into<String>) {
        if let Some(form) = self.form.as_ref() {
            self.form = Some(form.edit(index, value));
        }
    }

    /// Load the value of field `index` into the editor buffer.
    pub fn begin_editing(&mut self, index: usize) {
        let value = self.field(index).map(|field| field.value.clone()).unwrap_or_default();
        self.editor.reset(value);
    }

    /// Write the editor buffer into field `index`.
    pub fn commit_editor(&mut self, index: usize) {
        let value = self.editor.input().to_string();
        self.edit(index, value);
    }

    pub fn toggle_boolean(&mut self, index: usize) {
        let Some(field) = self.field(index).filter(|field| field.kind == FieldKind::Boolean) else {
            return;
        };
        let next = if field.is_checked() { BOOLEAN_FALSE } else { BOOLEAN_TRUE };
        self.edit(index, next);
    }

    pub fn cycle_enum(&mut self, index: usize, forward: bool) {
        let Some(field) = self.field(index).filter(|field| field.kind == FieldKind::Enum) else {
            return;
        };
        if let Some(next) = next_option(&field.options, &field.value, forward).map(str::to_string) {
            self.edit(index, next);
        }
    }

    /// Record the outcome of a run if it belongs to the action currently shown.
    pub fn apply_result(&mut self, package_id: &str, action_id: &str, state: RunState) -> bool {
        let Some(form) = self.form.as_mut() else {
            return false;
        };
        if to_kebab_case(&form.package_name) != package_id || to_kebab_case(&form.action_name) != action_id {
            return false;
        }
        form.set_result(state);
        true
    }

    /// Result panel contents, present only once a run settled with something to show.
    pub fn displayed_result(&self) -> Option<DisplayedResult> {
        let form = self.form.as_ref()?;
        if form.is_busy() || !form.result.has_displayable_result() {
            return None;
        }
        match &form.result {
            RunState::Succeeded(data) => Some(DisplayedResult {
                text: stringify_result(data.as_ref()),
                is_error: false,
            }),
            RunState::Failed(message) => Some(DisplayedResult {
                text: message.clone(),
                is_error: true,
            }),
            RunState::Idle | RunState::Pending => None,
        }
    }
}

/// Option following (or preceding) `current`; an unset value starts at the ends.
pub fn next_option<'a>(options: &'a [String], current: &str, forward: bool) -> Option<&'a str> {
    if options.is_empty() {
        return None;
    }
    let last = options.len() - 1;
    let index = match options.iter().position(|option| option == current) {
        Some(position) if forward => (position + 1) % options.len(),
        Some(position) => position.checked_sub(1).unwrap_or(last),
        None if forward => 0,
        None => last,
    };
    options.get(index).map(String::as_str)
}

/// Whether `character` may be typed into a numeric buffer at its cursor.
pub fn allow_numeric_char(buffer: &TextInputState, character: char, kind: FieldKind) -> bool {
    if character.is_ascii_digit() {
        return true;
    }
    if character == '-' {
        return buffer.cursor() == 0 && !buffer.input().starts_with('-');
    }
    if character == '.' && kind == FieldKind::Number {
        return !buffer.input().contains('.');
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loaded() -> ActionFormState {
        let package = ActionPackage {
            name: "Mail Tools".into(),
            actions: Vec::new(),
        };
        let action = Action {
            name: "Send Mail".into(),
            input_schema: r#"{"properties": {
                "to": {"type": "string"},
                "urgent": {"type": "boolean"},
                "tone": {"type": "string", "enum": ["calm", "stern"]},
                "retries": {"type": "integer"}
            }}"#
            .into(),
            docs: Some("Sends one message.".into()),
        };
        let mut state = ActionFormState::default();
        state.load(&package, &action).expect("form loads");
        state
    }

    #[test]
    fn editor_commits_only_the_focused_field() {
        let mut state = loaded();
        state.begin_editing(0);
        for character in "ada@example.com".chars() {
            state.editor.insert_char(character);
        }
        state.commit_editor(0);

        let form = state.form().expect("form");
        assert_eq!(form.fields[0].value, "ada@example.com");
        assert_eq!(form.fields[1].value, "False");
        assert_eq!(form.fields[3].value, "");
    }

    #[test]
    fn boolean_toggle_flips_between_literals() {
        let mut state = loaded();
        state.toggle_boolean(1);
        assert_eq!(state.field(1).map(|field| field.value.as_str()), Some("True"));
        state.toggle_boolean(1);
        assert_eq!(state.field(1).map(|field| field.value.as_str()), Some("False"));
        state.toggle_boolean(0);
        assert_eq!(state.field(0).map(|field| field.value.as_str()), Some(""));
    }

    #[test]
    fn enum_cycling_wraps_in_both_directions() {
        let options = vec!["calm".to_string(), "stern".to_string()];
        assert_eq!(next_option(&options, "", true), Some("calm"));
        assert_eq!(next_option(&options, "", false), Some("stern"));
        assert_eq!(next_option(&options, "stern", true), Some("calm"));
        assert_eq!(next_option(&options, "calm", false), Some("stern"));
        assert_eq!(next_option(&[], "", true), None);

        let mut state = loaded();
        state.cycle_enum(2, true);
        assert_eq!(state.field(2).map(|field| field.value.as_str()), Some("calm"));
    }

    #[test]
    fn numeric_filter_follows_field_kind() {
        let mut buffer = TextInputState::default();
        assert!(allow_numeric_char(&buffer, '-', FieldKind::Integer));
        assert!(!allow_numeric_char(&buffer, '.', FieldKind::Integer));
        assert!(allow_numeric_char(&buffer, '.', FieldKind::Number));
        assert!(!allow_numeric_char(&buffer, 'x', FieldKind::Number));
        buffer.reset("1.5");
        assert!(!allow_numeric_char(&buffer, '.', FieldKind::Number));
        assert!(!allow_numeric_char(&buffer, '-', FieldKind::Number));
    }

    #[test]
    fn results_apply_only_to_the_shown_action() {
        let mut state = loaded();
        assert!(!state.apply_result("other-package", "send-mail", RunState::Succeeded(Some(json!(1)))));
        assert!(state.displayed_result().is_none());

        assert!(state.apply_result("mail-tools", "send-mail", RunState::Pending));
        assert!(state.displayed_result().is_none());

        assert!(state.apply_result("mail-tools", "send-mail", RunState::Succeeded(Some(json!({"id": 7})))));
        let shown = state.displayed_result().expect("result shown");
        assert!(!shown.is_error);
        assert_eq!(shown.text, "{\n  \"id\": 7\n}");

        state.apply_result("mail-tools", "send-mail", RunState::Failed("boom".into()));
        assert_eq!(
            state.displayed_result(),
            Some(DisplayedResult {
                text: "boom".into(),
                is_error: true
            })
        );
    }

    #[test]
    fn undefined_success_shows_nothing() {
        let mut state = loaded();
        state.apply_result("mail-tools", "send-mail", RunState::Succeeded(None));
        assert!(state.displayed_result().is_none());
    }

    #[test]
    fn malformed_schema_is_reported_without_a_form() {
        let mut state = loaded();
        let action = Action {
            name: "Broken".into(),
            input_schema: "{".into(),
            docs: None,
        };
        assert!(state.load(&ActionPackage::default(), &action).is_err());
        assert!(state.form().is_none());
        assert!(state.load_error.as_deref().is_some_and(|error| error.starts_with("Broken:")));
    }
}
