use std::sync::{Arc, Mutex};

use actrun_api::{ActionInvoker, RunError};
use actrun_engine::{ActionForm, Submission, SubmitController, prepare_submission};
use actrun_types::{Action, ActionPackage, RunState, ServerConfig};
use actrun_util::{ApiKeyStore, MemoryKeyStore, stringify_result};
use async_trait::async_trait;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
struct RecordedCall {
    package_id: String,
    action_id: String,
    payload: Value,
    api_key: Option<String>,
}

/// Invoker that records calls and answers with a canned outcome.
struct FakeInvoker {
    outcome: Result<Option<Value>, RunError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeInvoker {
    fn answering(outcome: Result<Option<Value>, RunError>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ActionInvoker for FakeInvoker {
    async fn run_action(
        &self,
        package_id: &str,
        action_id: &str,
        payload: &Value,
        api_key: Option<&str>,
    ) -> Result<Option<Value>, RunError> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            package_id: package_id.to_string(),
            action_id: action_id.to_string(),
            payload: payload.clone(),
            api_key: api_key.map(str::to_string),
        });
        self.outcome.clone()
    }
}

fn load_fixture() -> (ActionPackage, Action) {
    let package: ActionPackage =
        serde_json::from_str(include_str!("data/package_fixture.json")).expect("fixture package parses");
    let action = package.find_action("Create Ticket").cloned().expect("fixture action present");
    (package, action)
}

fn fixture_form() -> ActionForm {
    let (package, action) = load_fixture();
    ActionForm::new(&package, &action).expect("fixture form builds")
}

fn controller(invoker: Arc<FakeInvoker>, auth_enabled: bool, stored_key: &str) -> SubmitController {
    let key_store: Arc<dyn ApiKeyStore> = Arc::new(MemoryKeyStore::with_value(stored_key));
    SubmitController::new(invoker, key_store, ServerConfig { auth_enabled })
}

#[test]
fn fixture_builds_one_field_per_property_in_order() {
    let form = fixture_form();
    let names: Vec<_> = form.fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(names, vec!["summary", "priority", "estimate", "urgent", "labels", "notify"]);
    assert_eq!(form.fields[5].label(), "Notify watchers");
    assert_eq!(form.fields[0].label(), "Summary *");
}

#[tokio::test]
async fn success_reports_pending_then_value() {
    let invoker = FakeInvoker::answering(Ok(Some(json!(42))));
    let controller = controller(invoker.clone(), false, "");
    let form = fixture_form().edit(0, "Printer on fire");

    let mut states = Vec::new();
    let final_state = controller.submit(&form, |state| states.push(state)).await;

    assert_eq!(states, vec![RunState::Pending, RunState::Succeeded(Some(json!(42)))]);
    let Some(RunState::Succeeded(data)) = final_state else {
        panic!("expected success, got {final_state:?}");
    };
    assert_eq!(stringify_result(data.as_ref()), "42");
}

#[tokio::test]
async fn failure_message_is_shown_verbatim() {
    let invoker = FakeInvoker::answering(Err(RunError::Status {
        status: 500,
        message: "boom".into(),
    }));
    let controller = controller(invoker, false, "");

    let mut last = RunState::Idle;
    controller.submit(&fixture_form(), |state| last = state).await;
    assert_eq!(last, RunState::Failed("boom".into()));
}

#[tokio::test]
async fn call_uses_kebab_cased_identifiers_and_typed_payload() {
    let invoker = FakeInvoker::answering(Ok(None));
    let controller = controller(invoker.clone(), false, "");
    let form = fixture_form()
        .edit(0, "Printer on fire")
        .edit(1, "high")
        .edit(2, "2.5")
        .edit(4, r#"["hw", "office"]"#);

    controller.submit(&form, |_| {}).await;

    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].package_id, "helpdesk-tools");
    assert_eq!(calls[0].action_id, "create-ticket");
    assert_eq!(
        calls[0].payload,
        json!({
            "summary": "Printer on fire",
            "priority": "high",
            "estimate": 2.5,
            "urgent": false,
            "labels": ["hw", "office"],
            "notify": true
        })
    );
}

#[tokio::test]
async fn credential_is_sent_only_when_auth_is_enabled() {
    let invoker = FakeInvoker::answering(Ok(None));
    controller(invoker.clone(), false, "stored-key")
        .submit(&fixture_form(), |_| {})
        .await;
    assert_eq!(invoker.calls()[0].api_key, None);

    let invoker = FakeInvoker::answering(Ok(None));
    controller(invoker.clone(), true, "stored-key")
        .submit(&fixture_form(), |_| {})
        .await;
    assert_eq!(invoker.calls()[0].api_key.as_deref(), Some("stored-key"));
}

#[tokio::test]
async fn missing_names_make_submission_a_no_op() {
    let invoker = FakeInvoker::answering(Ok(Some(json!("unused"))));
    let controller = controller(invoker.clone(), false, "");

    let mut form = fixture_form().with_result(RunState::Failed("earlier".into()));
    form.action_name.clear();

    let mut states = Vec::new();
    let outcome = controller.submit(&form, |state| states.push(state)).await;

    assert_eq!(outcome, None);
    assert!(states.is_empty());
    assert!(invoker.calls().is_empty());
    assert_eq!(form.result, RunState::Failed("earlier".into()));
}

#[tokio::test]
async fn unconvertible_payload_fails_without_a_call() {
    let invoker = FakeInvoker::answering(Ok(None));
    let controller = controller(invoker.clone(), false, "");
    let form = fixture_form().edit(2, "soon");

    let mut states = Vec::new();
    controller.submit(&form, |state| states.push(state)).await;

    assert_eq!(states, vec![RunState::Failed("Field 'estimate' expects a number, got 'soon'".into())]);
    assert!(invoker.calls().is_empty());
}

#[test]
fn boolean_toggle_changes_payload_value() {
    let key_store = MemoryKeyStore::default();
    let config = ServerConfig::default();
    let form = fixture_form();
    assert_eq!(form.fields[3].value, "False");

    let Submission::Ready(request) = prepare_submission(&form, &config, &key_store) else {
        panic!("fixture form should be submittable");
    };
    assert_eq!(request.payload["urgent"], json!(false));

    let toggled = form.edit(3, "True");
    let Submission::Ready(request) = prepare_submission(&toggled, &config, &key_store) else {
        panic!("fixture form should be submittable");
    };
    assert_eq!(request.payload["urgent"], json!(true));
}
