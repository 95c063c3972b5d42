use std::sync::Arc;

use renowiz::catalog::ProcedureKind;
use renowiz::procedure::{AnswerState, ProcedureController, ProcedureEvent, Session, reduce};
use serde_json::json;

const INDIVIDUAL_CATALOG: [&str; 10] = [
    "reform-area",
    "priority-points",
    "completion-timing",
    "budget-loan",
    "estimate-status",
    "customer-type",
    "individual-info",
    "address",
    "occupation",
    "family",
];

fn hearing() -> Arc<renowiz::Procedure> {
    Arc::new(ProcedureKind::Hearing.procedure().expect("hearing catalog is valid"))
}

fn step_ids(controller: &ProcedureController) -> Vec<&str> {
    controller.steps().iter().map(|step| step.id.as_str()).collect()
}

#[test]
fn new_individual_customer_has_ten_steps() {
    let answers = AnswerState::new()
        .with("customer_type", "new")
        .with("customer_category", "individual");
    let controller = ProcedureController::with_answers(hearing(), answers);

    assert_eq!(step_ids(&controller), INDIVIDUAL_CATALOG.to_vec());
    assert!(controller.steps()[9].is_terminal);
}

#[test]
fn switching_to_corporate_at_step_seven_shrinks_and_clamps() {
    let mut controller = ProcedureController::start(hearing());
    controller.set_answer("customer_type", "new");
    controller.set_answer("customer_category", "individual");
    controller.go_to(6);
    assert_eq!(controller.current_step().id, "individual-info");

    controller.set_answer("customer_category", "corporate");

    assert_eq!(controller.steps().len(), 8);
    assert_eq!(controller.current_index(), 6);
    assert_eq!(controller.current_step().id, "corporate-info");
}

#[test]
fn reaching_step_seven_through_guarded_next() {
    let mut controller = ProcedureController::start(hearing());

    controller.set_answer("reform_areas", json!(["kitchen", "bath"]));
    controller.next();
    controller.next();
    controller.next();
    assert_eq!(controller.current_step().id, "budget-loan");
    assert!(!controller.can_go_next());

    controller.set_answer("budget", "");
    assert!(!controller.can_go_next());
    controller.set_answer("budget", "abc");
    assert!(!controller.can_go_next());
    controller.set_answer("budget", "3,000,000");
    assert!(controller.can_go_next());

    controller.next();
    controller.next();
    assert_eq!(controller.current_step().id, "customer-type");
    assert!(controller.is_on_last_step());
    assert!(!controller.can_go_next());

    controller.set_answer("customer_type", "new");
    controller.set_answer("customer_category", "individual");
    assert_eq!(controller.current_index(), 5);
    assert!(controller.can_go_next());
    controller.next();
    assert_eq!(controller.progress(), (7, 10));
}

#[test]
fn switching_to_existing_customer_drops_profile_steps() {
    let mut controller = ProcedureController::with_answers(
        hearing(),
        AnswerState::new()
            .with("customer_type", "new")
            .with("customer_category", "individual"),
    );
    controller.go_to(9);
    controller.set_answer("customer_type", "existing");

    assert_eq!(controller.steps().len(), 7);
    assert_eq!(controller.current_step().id, "customer-lookup");
    assert!(controller.is_on_last_step());
}

#[test]
fn address_step_keeps_position_when_category_flips_back() {
    let mut controller = ProcedureController::with_answers(
        hearing(),
        AnswerState::new()
            .with("customer_type", "new")
            .with("customer_category", "corporate"),
    );
    controller.go_to(7);
    assert_eq!(controller.current_step().id, "address");

    controller.set_answer("customer_category", "individual");
    assert_eq!(controller.current_step().id, "address");
    assert_eq!(controller.current_index(), 7);
}

#[test]
fn step_list_is_independent_of_answer_order() {
    let procedure = hearing();
    let first = AnswerState::new()
        .with("customer_category", "individual")
        .with("budget", "100")
        .with("customer_type", "new");
    let second = AnswerState::new()
        .with("customer_type", "new")
        .with("customer_category", "individual")
        .with("budget", "100");

    assert_eq!(procedure.build_steps(&first), procedure.build_steps(&second));
}

#[test]
fn reduced_session_rebuilds_steps_for_existing_customer() {
    let procedure = hearing();
    let session = Session::start(&procedure, AnswerState::new());
    assert_eq!(session.state().len(), 6);

    let session = reduce(&procedure, &session, ProcedureEvent::set("customer_type", "existing"));
    let session = reduce(&procedure, &session, ProcedureEvent::GoTo(6));
    assert_eq!(session.answers().text("customer_type"), Some("existing"));
    assert_eq!(session.state().len(), 7);
    assert_eq!(session.state().current_step().id, "customer-lookup");
    assert!(!session.navigation().can_go_next);
    assert!(session.navigation().can_go_previous);
}
