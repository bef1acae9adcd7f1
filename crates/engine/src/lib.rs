//! # Actrun Engine
//!
//! The engine turns an action's input schema into an editable form and a
//! form into a run request.
//!
//! ## Usage
//!
//! ```rust
//! use actrun_engine::ActionForm;
//! use actrun_types::{Action, ActionPackage, RunState};
//!
//! let action = Action {
//!     name: "Greet".into(),
//!     input_schema: r#"{"properties": {"name": {"type": "string"}}, "required": ["name"]}"#.into(),
//!     docs: None,
//! };
//! let package = ActionPackage { name: "Examples".into(), actions: vec![action.clone()] };
//!
//! let form = ActionForm::new(&package, &action)?.edit(0, "Ada");
//! assert_eq!(form.fields[0].value, "Ada");
//! assert_eq!(form.result, RunState::Idle);
//! assert_eq!(form.payload()?, serde_json::json!({"name": "Ada"}));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`form::builder`**: schema properties to ordered [`FormField`](actrun_types::FormField) entries
//! - **`form`**: [`ActionForm`] owned state and the pure field editor
//! - **`form::payload`**: typed request payload from string-encoded values
//! - **`submit`**: [`SubmitController`] preparing and issuing run-action calls

pub mod form;
pub mod submit;

pub use form::{ActionForm, PayloadError, build_form_fields, form_fields_to_payload};
pub use submit::{Submission, SubmitController, prepare_submission, run_submission};
