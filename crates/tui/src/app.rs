//! Application state for the actrun TUI.
//!
//! `App` owns the catalog, the form of the selected action, and focus. State
//! changes happen here or in components; anything touching the network, the
//! clipboard, or the key store is returned as an [`Effect`] and executed by
//! the runtime.

use actrun_engine::{Submission, SubmitController};
use actrun_types::{Effect, Msg, RunState};
use tracing::{debug, warn};

use crate::ui::components::action_form::state::ActionFormState;
use crate::ui::components::catalog::state::CatalogState;
use crate::ui::theme::Theme;

/// Spinner frames shown on the Run button while a call is in flight.
pub const THROBBER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Cross-cutting shared context owned by the App.
#[derive(Debug)]
pub struct SharedCtx {
    pub theme: Box<dyn Theme>,
    /// Invoker, key store, and server settings used to submit forms
    pub controller: SubmitController,
}

/// Which control receives key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Catalog,
    ApiKey,
    Field(usize),
    RunButton,
}

/// One-line message shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub is_error: bool,
}

#[derive(Debug)]
pub struct App {
    pub ctx: SharedCtx,
    pub catalog: CatalogState,
    pub action_form: ActionFormState,
    pub focus: Focus,
    /// Whether any background task is running
    pub executing: bool,
    /// Animation frame for the execution throbber
    pub throbber_idx: usize,
    pub status: Option<StatusLine>,
    /// Action to open once the catalog arrives
    initial_selection: Option<(String, String)>,
}

impl App {
    pub fn new(theme: Box<dyn Theme>, controller: SubmitController, initial_selection: Option<(String, String)>) -> Self {
        let mut action_form = ActionFormState::default();
        if controller.server_config().auth_enabled {
            action_form.api_key.reset(controller.key_store().get_or_empty());
        }
        Self {
            ctx: SharedCtx { theme, controller },
            catalog: CatalogState::default(),
            action_form,
            focus: Focus::Catalog,
            executing: false,
            throbber_idx: 0,
            status: None,
            initial_selection,
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.ctx.controller.server_config().auth_enabled
    }

    /// Focusable controls in Tab order.
    pub fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![Focus::Catalog];
        if self.action_form.form().is_none() {
            return order;
        }
        if self.auth_enabled() {
            order.push(Focus::ApiKey);
        }
        order.extend((0..self.action_form.field_count()).map(Focus::Field));
        order.push(Focus::RunButton);
        order
    }

    pub fn focus_next(&mut self) {
        self.step_focus(true);
    }

    pub fn focus_previous(&mut self) {
        self.step_focus(false);
    }

    fn step_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let current = order.iter().position(|focus| *focus == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % order.len()
        } else {
            current.checked_sub(1).unwrap_or(order.len() - 1)
        };
        self.set_focus(order[next]);
    }

    pub fn set_focus(&mut self, focus: Focus) {
        if let Focus::Field(index) = focus {
            self.action_form.begin_editing(index);
        }
        self.focus = focus;
    }

    /// Build the form for the catalog selection and move focus into it.
    pub fn open_selected_action(&mut self) {
        let Some((package, action)) = self.catalog.selected_action() else {
            return;
        };
        let (package, action) = (package.clone(), action.clone());
        match self.action_form.load(&package, &action) {
            Ok(()) => {
                debug!(package = %package.name, action = %action.name, "opened action form");
                self.status = None;
                if let Some(first) = self.focus_order().get(1).copied() {
                    self.set_focus(first);
                }
            }
            Err(error) => {
                warn!(package = %package.name, action = %action.name, %error, "cannot build form");
                self.set_status(format!("Cannot build form for {}: {error}", action.name), true);
                self.focus = Focus::Catalog;
            }
        }
    }

    /// Submit the current form.
    ///
    /// Missing identifiers make this a no-op. A payload that cannot be built
    /// fails the form without issuing a call.
    pub fn submit(&mut self) -> Vec<Effect> {
        let Some(form) = self.action_form.form() else {
            return Vec::new();
        };
        match self.ctx.controller.prepare(form) {
            Submission::Skipped => Vec::new(),
            Submission::Rejected(message) => {
                if let Some(form) = self.action_form.form_mut() {
                    form.set_result(RunState::Failed(message));
                }
                Vec::new()
            }
            Submission::Ready(request) => {
                if let Some(form) = self.action_form.form_mut() {
                    form.set_result(RunState::Pending);
                }
                if !self.executing {
                    self.throbber_idx = 0;
                }
                self.executing = true;
                vec![Effect::RunAction(request)]
            }
        }
    }

    /// Copy the displayed result, if any.
    pub fn copy_result(&self) -> Vec<Effect> {
        self.action_form
            .displayed_result()
            .map(|result| vec![Effect::CopyToClipboard(result.text)])
            .unwrap_or_default()
    }

    pub fn set_status(&mut self, message: impl Into<String>, is_error: bool) {
        self.status = Some(StatusLine {
            message: message.into(),
            is_error,
        });
    }

    /// Updates the application state based on a message.
    pub fn update(&mut self, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.executing {
                    self.throbber_idx = (self.throbber_idx + 1) % THROBBER_FRAMES.len();
                }
            }
            Msg::Resize(..) => {}
            Msg::RunFinished {
                package_id,
                action_id,
                state,
            } => {
                if !self.action_form.apply_result(package_id, action_id, state.clone()) {
                    debug!(%package_id, %action_id, "dropping result for an action no longer shown");
                }
            }
            Msg::CatalogLoaded(Ok(packages)) => {
                self.catalog.set_packages(packages.clone());
                if let Some((package, action)) = self.initial_selection.take() {
                    if self.catalog.select_by_name(&package, &action) {
                        self.open_selected_action();
                    } else {
                        self.set_status(format!("Action '{action}' not found in package '{package}'"), true);
                    }
                }
            }
            Msg::CatalogLoaded(Err(message)) => {
                self.catalog.set_error(message.clone());
                self.set_status(format!("Failed to load actions: {message}"), true);
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actrun_api::ActionServerClient;
    use actrun_types::{Action, ActionPackage, ServerConfig};
    use actrun_util::{ApiKeyStore, MemoryKeyStore};
    use serde_json::json;

    use crate::ui::theme::DraculaTheme;

    fn app(auth_enabled: bool) -> App {
        let invoker = Arc::new(ActionServerClient::new("http://localhost:9").expect("client"));
        let key_store: Arc<dyn ApiKeyStore> = Arc::new(MemoryKeyStore::with_value("secret"));
        let controller = SubmitController::new(invoker, key_store, ServerConfig { auth_enabled });
        App::new(Box::new(DraculaTheme::new()), controller, Some(("Tools".into(), "Add Numbers".into())))
    }

    fn catalog() -> Vec<ActionPackage> {
        vec![ActionPackage {
            name: "Tools".into(),
            actions: vec![
                Action {
                    name: "Add Numbers".into(),
                    input_schema: r#"{"properties": {
                        "a": {"type": "integer"},
                        "b": {"type": "number"}
                    }}"#
                    .into(),
                    docs: None,
                },
                Action {
                    name: "Noop".into(),
                    ..Action::default()
                },
            ],
        }]
    }

    #[test]
    fn catalog_arrival_opens_the_requested_action() {
        let mut app = app(false);
        app.update(&Msg::CatalogLoaded(Ok(catalog())));

        let form = app.action_form.form().expect("form opened");
        assert_eq!(form.action_name, "Add Numbers");
        assert_eq!(app.focus, Focus::Field(0));
    }

    #[test]
    fn unknown_initial_action_is_reported() {
        let invoker = Arc::new(ActionServerClient::new("http://localhost:9").expect("client"));
        let controller = SubmitController::new(invoker, Arc::new(MemoryKeyStore::default()), ServerConfig::default());
        let mut app = App::new(Box::new(DraculaTheme::new()), controller, Some(("Tools".into(), "Missing".into())));
        app.update(&Msg::CatalogLoaded(Ok(catalog())));

        assert!(app.action_form.form().is_none());
        assert!(app.status.as_ref().is_some_and(|status| status.is_error));
    }

    #[test]
    fn focus_order_includes_api_key_only_with_auth() {
        let mut app = app(false);
        app.update(&Msg::CatalogLoaded(Ok(catalog())));
        assert_eq!(app.focus_order(), vec![Focus::Catalog, Focus::Field(0), Focus::Field(1), Focus::RunButton]);

        let mut app = self::app(true);
        app.update(&Msg::CatalogLoaded(Ok(catalog())));
        assert_eq!(app.focus, Focus::ApiKey);
        assert_eq!(app.action_form.api_key.input(), "secret");
        app.focus_previous();
        assert_eq!(app.focus, Focus::Catalog);
        app.focus_previous();
        assert_eq!(app.focus, Focus::RunButton);
    }

    #[test]
    fn submit_marks_pending_and_requests_a_run() {
        let mut app = app(true);
        app.update(&Msg::CatalogLoaded(Ok(catalog())));
        app.set_focus(Focus::Field(0));
        app.action_form.editor.insert_char('4');
        app.action_form.commit_editor(0);

        let effects = app.submit();
        let [Effect::RunAction(request)] = effects.as_slice() else {
            panic!("expected a run effect, got {effects:?}");
        };
        assert_eq!(request.package_id, "tools");
        assert_eq!(request.action_id, "add-numbers");
        assert_eq!(request.payload, json!({"a": 4}));
        assert_eq!(request.api_key.as_deref(), Some("secret"));
        assert!(app.executing);
        assert!(app.action_form.form().is_some_and(|form| form.is_busy()));
    }

    #[test]
    fn rejected_payload_fails_without_effects() {
        let mut app = app(false);
        app.update(&Msg::CatalogLoaded(Ok(catalog())));
        app.set_focus(Focus::Field(1));
        app.action_form.editor.reset("1.2.3");
        app.action_form.commit_editor(1);

        assert!(app.submit().is_empty());
        let result = app.action_form.displayed_result().expect("error shown");
        assert!(result.is_error);
        assert!(!app.executing);
    }

    #[test]
    fn run_result_is_shown_and_copyable() {
        let mut app = app(false);
        app.update(&Msg::CatalogLoaded(Ok(catalog())));
        app.submit();
        app.update(&Msg::RunFinished {
            package_id: "tools".into(),
            action_id: "add-numbers".into(),
            state: RunState::Succeeded(Some(json!(42))),
        });

        assert_eq!(app.copy_result(), vec![Effect::CopyToClipboard("42".into())]);
    }

    #[test]
    fn catalog_failure_sets_error_status() {
        let mut app = app(false);
        app.update(&Msg::CatalogLoaded(Err("connection refused".into())));
        assert_eq!(app.catalog.error.as_deref(), Some("connection refused"));
        assert_eq!(app.status.as_ref().map(|status| status.message.as_str()), Some("Failed to load actions: connection refused"));
    }
}
