use std::sync::Arc;

use renowiz::catalog::ProcedureKind;
use renowiz::handoff::{FileStorage, HandoffStorage, HandoffStore, LaunchParams, MemoryStorage};
use renowiz::procedure::{AnswerState, ProcedureController};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn additional_order_hands_off_between_windows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("handoff.json");
    let parent_store = HandoffStore::new(Arc::new(FileStorage::new(&path)));
    let child_store = HandoffStore::new(Arc::new(FileStorage::new(&path)));
    let procedure = Arc::new(ProcedureKind::AdditionalOrder.procedure().unwrap());

    let mut parent = ProcedureController::start(procedure.clone());
    parent.set_answer("project_id", "P-2088");
    parent.set_answer("customer_name", "Yamada");
    parent.set_answer("order_items", json!(["handrail", "outlet"]));
    parent.set_answer("has_signature", true);

    let url = parent
        .launch(
            &parent_store,
            "http://localhost:3000",
            ProcedureKind::AdditionalOrder.route(),
        )
        .unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:3000/projects/additional-order?project=P-2088"
    );

    let child = ProcedureController::resume(
        procedure,
        &child_store,
        &LaunchParams::from_url(url.as_str()).unwrap(),
    );
    assert_eq!(child.answers().text("customer_name"), Some("Yamada"));
    assert_eq!(child.answers().get("order_items"), Some(&json!(["handrail", "outlet"])));
    assert_eq!(child.answers().get("amount"), Some(&json!("")));
    assert!(!child.answers().is_set("has_signature"));
    assert!(child.can_go_next());
}

#[test]
fn read_after_write_round_trips_declared_fields() {
    let store = HandoffStore::new(Arc::new(MemoryStorage::new()));
    let procedure = ProcedureKind::ChangeConsent.procedure().unwrap();
    let schema = procedure.handoff();

    let payload = AnswerState::new()
        .with("project_id", "P-7")
        .with("change_amount", 42_000)
        .with("customer_category", "individual");
    store.write(schema, &payload).unwrap();
    let read = store.read(schema);

    for (field, value) in payload.iter() {
        assert_eq!(read.get(field), Some(value), "{field}");
    }
    for field in schema.fields() {
        if !payload.is_set(&field.name) && !field.default.is_null() {
            assert_eq!(read.get(&field.name), Some(&field.default), "{}", field.name);
        }
    }
}

#[test]
fn garbage_under_handoff_key_yields_defaults() {
    let storage = Arc::new(MemoryStorage::new());
    let store = HandoffStore::new(storage.clone());

    for kind in [
        ProcedureKind::Hearing,
        ProcedureKind::AdditionalOrder,
        ProcedureKind::CompletionSurvey,
    ] {
        let procedure = kind.procedure().unwrap();
        let schema = procedure.handoff();
        storage.set(schema.key(), "<<not json>>").unwrap();
        assert_eq!(store.read(schema), schema.defaults(), "{kind}");
    }
}

#[test]
fn last_write_wins_between_windows() {
    let storage = Arc::new(MemoryStorage::new());
    let first_window = HandoffStore::new(storage.clone());
    let second_window = HandoffStore::new(storage);
    let procedure = ProcedureKind::RatificationConsent.procedure().unwrap();
    let schema = procedure.handoff();

    first_window
        .write(schema, &AnswerState::new().with("ratification_note", "first"))
        .unwrap();
    second_window
        .write(schema, &AnswerState::new().with("ratification_note", "second"))
        .unwrap();

    assert_eq!(first_window.read(schema).text("ratification_note"), Some("second"));
}

#[test]
fn hearing_query_overrides_stored_customer_type() {
    let store = HandoffStore::new(Arc::new(MemoryStorage::new()));
    let procedure = Arc::new(ProcedureKind::Hearing.procedure().unwrap());
    store
        .write(
            procedure.handoff(),
            &AnswerState::new()
                .with("customer_type", "new")
                .with("customer_category", "corporate"),
        )
        .unwrap();

    let child = ProcedureController::resume(
        procedure,
        &store,
        &LaunchParams::from_query("customerType=existing&project=P-1"),
    );
    assert_eq!(child.answers().text("customer_type"), Some("existing"));
    assert_eq!(child.answers().text("customer_category"), Some("corporate"));
    assert_eq!(child.steps().last().map(|step| step.id.as_str()), Some("customer-lookup"));
}
