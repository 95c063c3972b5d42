//! Cancellation, change and ratification consent.
//!
//! All three share one frame: project summary, an optional company
//! representative page for corporate customers, the form-specific pages,
//! consent checkboxes, a drawn signature, then completion.

use crate::error::CatalogError;
use crate::handoff::FieldSpec;
use crate::procedure::{Condition, ExtensionRule, Guard, Procedure, ProcedureBuilder, Step, steps};

use super::hearing::CUSTOMER_CATEGORIES;

pub const CANCELLATION_KEY: &str = "cancellation-consent";
pub const CHANGE_KEY: &str = "change-consent";
pub const RATIFICATION_KEY: &str = "ratification-consent";

fn consent_frame(
    key: &str,
    title: &str,
    body: Vec<Step>,
    checkboxes: &[&str],
) -> ProcedureBuilder {
    let mut base = steps(&[("project-summary", "Project summary")]);
    base.extend(body);
    base.extend(steps(&[
        ("consent-checks", "Confirmation"),
        ("signature", "Signature"),
        ("complete", "Complete"),
    ]));

    Procedure::builder(key)
        .title(title)
        .base(base)
        .rule(ExtensionRule::after(
            "corporate-representative",
            "project-summary",
            Condition::when("customer_category", "corporate"),
            steps(&[("representative", "Company representative")]),
        ))
        .guard("representative", Guard::filled("representative_name"))
        .guard("consent-checks", Guard::all_checked(checkboxes))
        .guard("signature", Guard::signature("has_signature"))
        .handoff_field(FieldSpec::text("project_id"))
        .handoff_field(FieldSpec::text("customer_name"))
        .handoff_field(FieldSpec::choice("customer_category", CUSTOMER_CATEGORIES))
        .handoff_field(FieldSpec::amount("contract_amount"))
        .bind_query("project", "project_id")
}

pub fn cancellation() -> Result<Procedure, CatalogError> {
    consent_frame(
        CANCELLATION_KEY,
        "Cancellation consent",
        steps(&[
            ("cancellation-reason", "Cancellation reason"),
            ("refund", "Refund"),
        ]),
        &["agree_terms", "agree_refund_policy"],
    )
    .guard("cancellation-reason", Guard::filled("cancellation_reason"))
    .handoff_field(FieldSpec::text("cancellation_reason"))
    .handoff_field(FieldSpec::amount("refund_amount"))
    .build()
}

pub fn change() -> Result<Procedure, CatalogError> {
    consent_frame(
        CHANGE_KEY,
        "Change consent",
        steps(&[
            ("change-details", "Change details"),
            ("amount-change", "Amount change"),
        ]),
        &["agree_terms", "agree_schedule_change"],
    )
    .guard("change-details", Guard::filled("change_description"))
    .guard("amount-change", Guard::positive_amount("change_amount"))
    .handoff_field(FieldSpec::text("change_description"))
    .handoff_field(FieldSpec::amount("change_amount"))
    .build()
}

pub fn ratification() -> Result<Procedure, CatalogError> {
    consent_frame(
        RATIFICATION_KEY,
        "Ratification consent",
        steps(&[("ratification-details", "Ratification details")]),
        &["agree_terms", "agree_ratification"],
    )
    .guard("ratification-details", Guard::filled("ratification_note"))
    .handoff_field(FieldSpec::text("ratification_note"))
    .build()
}
