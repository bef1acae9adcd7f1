//! # Command Execution Layer
//!
//! Translates [`Effect`]s into side effects: run-action calls, catalog
//! fetches, key store writes, and clipboard access. State updates stay in
//! `App`; this is the imperative shell around it.
//!
//! Background work is returned as `JoinHandle<Msg>`s so the runtime can feed
//! each completion back through `MainView::handle_message`.

use std::sync::Arc;

use actrun_api::{ActionInvoker, ActionServerClient};
use actrun_engine::run_submission;
use actrun_types::{Effect, Msg, RunRequest, RunState};
use tokio::task::{JoinHandle, spawn};
use tracing::{debug, warn};

use crate::app::App;

/// Result of executing a batch of effects.
#[derive(Debug, Default)]
pub struct CommandBatch {
    /// Background tasks whose completion produces a message
    pub pending: Vec<JoinHandle<Msg>>,
    /// Set when an effect asked the application to exit
    pub quit: bool,
}

/// Execute `effects` in order.
pub fn run_from_effects(app: &mut App, client: &Arc<ActionServerClient>, effects: Vec<Effect>) -> CommandBatch {
    let mut batch = CommandBatch::default();
    for effect in effects {
        match effect {
            Effect::RunAction(request) => batch.pending.push(spawn_run(app, request)),
            Effect::LoadCatalog => {
                app.catalog.loading = true;
                batch.pending.push(spawn_catalog_load(Arc::clone(client)));
            }
            Effect::PersistApiKey(value) => persist_api_key(app, &value),
            Effect::CopyToClipboard(text) => execute_clipboard_set(app, text),
            Effect::Quit => batch.quit = true,
        }
    }
    batch
}

fn spawn_run(app: &App, request: RunRequest) -> JoinHandle<Msg> {
    spawn_run_task(app.ctx.controller.invoker(), request)
}

/// Run `request` on its own task; a panic in the call still reports
/// `Failed` for the originating action.
fn spawn_run_task(invoker: Arc<dyn ActionInvoker>, request: RunRequest) -> JoinHandle<Msg> {
    let package_id = request.package_id.clone();
    let action_id = request.action_id.clone();
    let run = spawn(async move { run_submission(invoker.as_ref(), request, |_| {}).await });
    spawn(async move {
        let state = run.await.unwrap_or_else(|error| {
            warn!(%package_id, %action_id, %error, "run task failed");
            RunState::Failed(format!("Execution task failed: {error}"))
        });
        Msg::RunFinished {
            package_id,
            action_id,
            state,
        }
    })
}

fn spawn_catalog_load(client: Arc<ActionServerClient>) -> JoinHandle<Msg> {
    spawn(async move {
        let result = client.list_action_packages().await.map_err(|error| format!("{error:#}"));
        if let Ok(packages) = &result {
            debug!(packages = packages.len(), "catalog loaded");
        }
        Msg::CatalogLoaded(result)
    })
}

fn persist_api_key(app: &mut App, value: &str) {
    if let Err(error) = app.ctx.controller.key_store().set(value) {
        warn!(%error, "failed to persist API key");
        app.set_status(format!("Could not save API key: {error}"), true);
    }
}

/// Write `text` to the system clipboard and report the outcome in the footer.
fn execute_clipboard_set(app: &mut App, text: String) {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
        Ok(()) => app.set_status("Result copied to clipboard", false),
        Err(error) => {
            warn!(%error, "clipboard write failed");
            app.set_status(format!("Clipboard error: {error}"), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actrun_api::RunError;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct PanickingInvoker;

    #[async_trait]
    impl ActionInvoker for PanickingInvoker {
        async fn run_action(
            &self,
            _package_id: &str,
            _action_id: &str,
            _payload: &Value,
            _api_key: Option<&str>,
        ) -> Result<Option<Value>, RunError> {
            panic!("invoker exploded");
        }
    }

    fn request() -> RunRequest {
        RunRequest {
            package_id: "tools".into(),
            action_id: "add-numbers".into(),
            payload: json!({}),
            api_key: None,
        }
    }

    #[tokio::test]
    async fn panicking_run_reports_failure_for_its_action() {
        let msg = spawn_run_task(Arc::new(PanickingInvoker), request()).await.expect("outer task completes");

        let (package_id, action_id, state) = match msg {
            Msg::RunFinished {
                package_id,
                action_id,
                state,
            } => (package_id, action_id, state),
            other => panic!("expected a run result, got {other:?}"),
        };
        assert_eq!(package_id, "tools");
        assert_eq!(action_id, "add-numbers");
        assert!(matches!(state, RunState::Failed(message) if message.starts_with("Execution task failed")));
    }
}
