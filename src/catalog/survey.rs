use crate::error::CatalogError;
use crate::handoff::FieldSpec;
use crate::procedure::{Condition, ExtensionRule, Guard, Procedure, steps};

pub const KEY: &str = "completion-survey";

pub const SURVEY_VARIANTS: &[&str] = &["standard", "with-supervisor"];

/// Completion survey handed to the customer at the end of a project. The
/// supervisor variant adds a rating for the site supervisor.
pub fn procedure() -> Result<Procedure, CatalogError> {
    Procedure::builder(KEY)
        .title("Completion survey")
        .base(steps(&[
            ("survey-intro", "Introduction"),
            ("satisfaction", "Overall satisfaction"),
            ("workmanship", "Workmanship"),
            ("staff-rating", "Staff"),
            ("comments", "Comments"),
            ("signature", "Signature"),
            ("complete", "Complete"),
        ]))
        .rule(ExtensionRule::after(
            "supervisor",
            "staff-rating",
            Condition::when("survey_variant", "with-supervisor"),
            steps(&[("supervisor-rating", "Supervisor")]),
        ))
        .guard("satisfaction", Guard::filled("satisfaction"))
        .guard("workmanship", Guard::filled("workmanship_rating"))
        .guard("staff-rating", Guard::filled("staff_rating"))
        .guard("supervisor-rating", Guard::filled("supervisor_rating"))
        .guard("signature", Guard::signature("has_signature"))
        .handoff_field(FieldSpec::text("project_id"))
        .handoff_field(FieldSpec::text("customer_name"))
        .handoff_field(FieldSpec::choice("survey_variant", SURVEY_VARIANTS))
        .bind_query("project", "project_id")
        .bind_query("variant", "survey_variant")
        .build()
}
