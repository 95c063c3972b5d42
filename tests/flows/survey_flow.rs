use std::sync::Arc;

use renowiz::catalog::ProcedureKind;
use renowiz::handoff::{HandoffStore, LaunchParams, MemoryStorage};
use renowiz::procedure::ProcedureController;

#[test]
fn supervisor_variant_from_query_adds_rating_step() {
    let store = HandoffStore::new(Arc::new(MemoryStorage::new()));
    let procedure = Arc::new(ProcedureKind::CompletionSurvey.procedure().unwrap());

    let params = LaunchParams::from_url("http://localhost:3000/survey?variant=with-supervisor&project=P-31")
        .unwrap();
    let controller = ProcedureController::resume(procedure, &store, &params);

    assert_eq!(controller.steps().len(), 8);
    assert!(controller.steps().iter().any(|step| step.id == "supervisor-rating"));
    assert_eq!(controller.answers().text("project_id"), Some("P-31"));
}

#[test]
fn unknown_variant_in_query_is_ignored() {
    let store = HandoffStore::new(Arc::new(MemoryStorage::new()));
    let procedure = Arc::new(ProcedureKind::CompletionSurvey.procedure().unwrap());

    let controller =
        ProcedureController::resume(procedure, &store, &LaunchParams::from_query("variant=bogus"));

    assert!(!controller.answers().is_set("survey_variant"));
    assert_eq!(controller.steps().len(), 7);
}

#[test]
fn rating_guards_gate_sequential_navigation() {
    let procedure = Arc::new(ProcedureKind::CompletionSurvey.procedure().unwrap());
    let mut controller = ProcedureController::start(procedure);
    controller.next();
    assert_eq!(controller.current_step().id, "satisfaction");
    assert!(!controller.can_go_next());

    controller.set_answer("satisfaction", 5);
    controller.next();
    assert_eq!(controller.current_step().id, "workmanship");
}
