//! Shared type definitions for the actrun workspace.

mod action;
mod form;

pub use action::{Action, ActionPackage, InputSchema, PropertySchema, SchemaError, ServerConfig};
pub use form::{BOOLEAN_FALSE, BOOLEAN_TRUE, FieldKind, FormField, RunState};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fully prepared run-action call.
///
/// Identifiers are already kebab-cased and the credential is present only
/// when the server requires authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub package_id: String,
    pub action_id: String,
    pub payload: Value,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// Messages that can be sent to update the application state.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick (e.g., throbbers)
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// A run started for `package_id`/`action_id` settled
    RunFinished {
        package_id: String,
        action_id: String,
        state: RunState,
    },
    /// Action catalog finished loading
    CatalogLoaded(Result<Vec<ActionPackage>, String>),
}

/// Side effects requested by components and executed by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue a run-action call
    RunAction(RunRequest),
    /// Persist a new API key value
    PersistApiKey(String),
    /// Copy text to the system clipboard
    CopyToClipboard(String),
    /// Fetch packages and actions from the server
    LoadCatalog,
    /// Leave the application
    Quit,
}
