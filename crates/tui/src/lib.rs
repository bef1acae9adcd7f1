//! # actrun TUI
//!
//! Terminal front end for running actions on an action server. The left pane
//! lists packages and actions; the right pane renders a form generated from
//! the selected action's input schema, a Run button, and the latest result.
//!
//! The TUI follows a component architecture: `App` owns state, components
//! handle keys and render, and side effects travel as `Effect`s to the
//! runtime in `ui::runtime`.

mod app;
mod cmd;
mod ui;

use std::sync::Arc;

use actrun_api::ActionServerClient;
use actrun_types::ServerConfig;
use actrun_util::ApiKeyStore;
use anyhow::Result;

/// Everything the TUI needs from the caller.
#[derive(Debug, Clone)]
pub struct TuiOptions {
    pub client: Arc<ActionServerClient>,
    pub key_store: Arc<dyn ApiKeyStore>,
    /// Settings fetched from the server before launch
    pub server_config: ServerConfig,
    /// `(package, action)` to open once the catalog is loaded
    pub initial_selection: Option<(String, String)>,
}

/// Runs the TUI until the user quits.
///
/// # Errors
///
/// Terminal setup or teardown failures (raw mode, alternate screen).
pub async fn run(options: TuiOptions) -> Result<()> {
    ui::runtime::run_app(options).await
}
