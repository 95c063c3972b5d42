use std::sync::Arc;

use renowiz::catalog::ProcedureKind;
use renowiz::procedure::{ProcedureController, ProcedureEvent, Session, reduce};

const CONSENT_KINDS: [ProcedureKind; 3] = [
    ProcedureKind::CancellationConsent,
    ProcedureKind::ChangeConsent,
    ProcedureKind::RatificationConsent,
];

#[test]
fn signature_step_unlocks_on_signature_alone() {
    for kind in CONSENT_KINDS {
        let procedure = Arc::new(kind.procedure().unwrap());
        let mut controller = ProcedureController::start(procedure);
        let signature = controller.steps().len() - 2;
        controller.go_to(signature);
        assert_eq!(controller.current_step().id, "signature", "{kind}");

        controller.set_answer("has_signature", false);
        assert!(!controller.can_go_next(), "{kind}");

        let answers_before = controller.answers().clone();
        controller.set_answer("has_signature", true);
        assert!(controller.can_go_next(), "{kind}");
        assert_eq!(controller.answers().len(), answers_before.len());

        controller.next();
        assert!(controller.is_on_last_step());
        assert_eq!(controller.current_step().id, "complete");
    }
}

#[test]
fn sidebar_jump_bypasses_blocked_step() {
    let procedure = Arc::new(ProcedureKind::ChangeConsent.procedure().unwrap());
    let mut controller = ProcedureController::start(procedure);
    controller.go_to(1);
    assert_eq!(controller.current_step().id, "change-details");

    controller.next();
    assert_eq!(controller.current_index(), 1);

    controller.go_to(4);
    assert_eq!(controller.current_index(), 4);
    assert_eq!(controller.current_step().id, "signature");
}

#[test]
fn backward_is_always_available() {
    let procedure = Arc::new(ProcedureKind::CancellationConsent.procedure().unwrap());
    let mut controller = ProcedureController::start(procedure);
    for index in 1..controller.steps().len() {
        controller.go_to(index);
        assert!(controller.can_go_previous());
        controller.previous();
        assert_eq!(controller.current_index(), index - 1);
    }
}

#[test]
fn corporate_customer_mid_flow_inserts_representative_before_cursor() {
    let procedure = Arc::new(ProcedureKind::ChangeConsent.procedure().unwrap());
    let mut controller = ProcedureController::start(procedure);
    controller.go_to(3);
    assert_eq!(controller.current_step().id, "consent-checks");

    controller.set_answer("customer_category", "corporate");
    assert_eq!(controller.current_step().id, "consent-checks");
    assert_eq!(controller.current_index(), 4);
    assert_eq!(controller.steps()[1].id, "representative");
}

#[test]
fn change_amount_must_be_positive_number() {
    let procedure = ProcedureKind::ChangeConsent.procedure().unwrap();
    let mut session = Session::start(&procedure, Default::default());
    session = reduce(&procedure, &session, ProcedureEvent::GoTo(2));
    assert_eq!(session.state().current_step().id, "amount-change");

    for (value, allowed) in [("", false), ("0", false), ("-10", false), ("ten", false), ("250000", true)] {
        session = reduce(&procedure, &session, ProcedureEvent::set("change_amount", value));
        assert_eq!(session.navigation().can_go_next, allowed, "change_amount={value:?}");
    }
}
