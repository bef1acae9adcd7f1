//! Submission of an [`ActionForm`] to the run-action invoker.
//!
//! Submission is split into a synchronous preparation step and an async run
//! step so the TUI can mark the form busy immediately and hand the call to a
//! background task. Nothing here prevents overlapping submissions; the busy
//! flag is advisory.

use std::sync::Arc;

use actrun_api::ActionInvoker;
use actrun_types::{RunRequest, RunState, ServerConfig};
use actrun_util::{ApiKeyStore, to_kebab_case};
use tracing::{info, warn};

use crate::form::ActionForm;

/// Outcome of preparing a form for submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Action or package name missing; nothing is issued.
    Skipped,
    /// The payload could not be built; carries the message to display.
    Rejected(String),
    /// A call ready to issue.
    Ready(RunRequest),
}

/// Turn the current form into a run request.
///
/// The credential is attached only when the server reports authentication
/// as enabled, and is then the currently stored API key.
pub fn prepare_submission(form: &ActionForm, server_config: &ServerConfig, key_store: &dyn ApiKeyStore) -> Submission {
    if !form.is_submittable() {
        return Submission::Skipped;
    }

    let payload = match form.payload() {
        Ok(payload) => payload,
        Err(error) => return Submission::Rejected(error.to_string()),
    };

    let api_key = server_config.auth_enabled.then(|| key_store.get_or_empty());

    Submission::Ready(RunRequest {
        package_id: to_kebab_case(&form.package_name),
        action_id: to_kebab_case(&form.action_name),
        payload,
        api_key,
    })
}

/// Issue `request`, reporting `Pending` and then the final state through `set_result`.
///
/// Returns the final state.
pub async fn run_submission<I, F>(invoker: &I, request: RunRequest, mut set_result: F) -> RunState
where
    I: ActionInvoker + ?Sized,
    F: FnMut(RunState),
{
    set_result(RunState::Pending);
    info!(package = %request.package_id, action = %request.action_id, "running action");

    let state = match invoker
        .run_action(&request.package_id, &request.action_id, &request.payload, request.api_key.as_deref())
        .await
    {
        Ok(data) => {
            info!(package = %request.package_id, action = %request.action_id, "action finished");
            RunState::Succeeded(data)
        }
        Err(error) => {
            warn!(package = %request.package_id, action = %request.action_id, %error, "action failed");
            RunState::Failed(error.message())
        }
    };

    set_result(state.clone());
    state
}

/// Bundles the collaborators needed to submit forms.
#[derive(Clone)]
pub struct SubmitController {
    invoker: Arc<dyn ActionInvoker>,
    key_store: Arc<dyn ApiKeyStore>,
    server_config: ServerConfig,
}

impl std::fmt::Debug for SubmitController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitController")
            .field("key_store", &self.key_store)
            .field("server_config", &self.server_config)
            .finish_non_exhaustive()
    }
}

impl SubmitController {
    pub fn new(invoker: Arc<dyn ActionInvoker>, key_store: Arc<dyn ApiKeyStore>, server_config: ServerConfig) -> Self {
        Self {
            invoker,
            key_store,
            server_config,
        }
    }

    pub fn server_config(&self) -> &ServerConfig {
        &self.server_config
    }

    pub fn key_store(&self) -> &Arc<dyn ApiKeyStore> {
        &self.key_store
    }

    pub fn invoker(&self) -> Arc<dyn ActionInvoker> {
        Arc::clone(&self.invoker)
    }

    pub fn prepare(&self, form: &ActionForm) -> Submission {
        prepare_submission(form, &self.server_config, self.key_store.as_ref())
    }

    /// Prepare and run `form` to completion.
    ///
    /// A skipped submission leaves the result untouched and returns `None`;
    /// a rejected payload reports `Failed` without issuing a call.
    pub async fn submit<F>(&self, form: &ActionForm, mut set_result: F) -> Option<RunState>
    where
        F: FnMut(RunState),
    {
        match self.prepare(form) {
            Submission::Skipped => None,
            Submission::Rejected(message) => {
                let state = RunState::Failed(message);
                set_result(state.clone());
                Some(state)
            }
            Submission::Ready(request) => Some(run_submission(self.invoker.as_ref(), request, set_result).await),
        }
    }
}
