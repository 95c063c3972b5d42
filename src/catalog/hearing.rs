use crate::error::CatalogError;
use crate::handoff::FieldSpec;
use crate::procedure::{Condition, ExtensionRule, Guard, Procedure, steps};

pub const KEY: &str = "hearing-form";

pub const CUSTOMER_TYPES: &[&str] = &["new", "existing"];
pub const CUSTOMER_CATEGORIES: &[&str] = &["individual", "corporate"];

/// Intake hearing. The customer-type step asks whether the customer is new
/// or existing and, for new customers, individual or corporate; the profile
/// steps that follow depend on both answers.
pub fn procedure() -> Result<Procedure, CatalogError> {
    Procedure::builder(KEY)
        .title("Hearing form")
        .base(steps(&[
            ("reform-area", "Reform area"),
            ("priority-points", "Priority points"),
            ("completion-timing", "Completion timing"),
            ("budget-loan", "Budget and loan"),
            ("estimate-status", "Estimate status"),
            ("customer-type", "Customer type"),
        ]))
        .rule(ExtensionRule::after(
            "new-individual",
            "customer-type",
            Condition::when("customer_type", "new").and("customer_category", "individual"),
            steps(&[
                ("individual-info", "Customer information"),
                ("address", "Address"),
                ("occupation", "Occupation"),
                ("family", "Family"),
            ]),
        ))
        .rule(ExtensionRule::after(
            "new-corporate",
            "customer-type",
            Condition::when("customer_type", "new").and("customer_category", "corporate"),
            steps(&[
                ("corporate-info", "Company information"),
                ("address", "Address"),
            ]),
        ))
        .rule(ExtensionRule::after(
            "existing",
            "customer-type",
            Condition::when("customer_type", "existing"),
            steps(&[("customer-lookup", "Existing customer")]),
        ))
        .guard("reform-area", Guard::filled("reform_areas"))
        .guard("budget-loan", Guard::positive_amount("budget"))
        .guard("individual-info", Guard::filled("customer_name"))
        .guard("corporate-info", Guard::filled("company_name"))
        .guard("customer-lookup", Guard::filled("existing_customer_id"))
        .handoff_field(FieldSpec::text("project_id"))
        .handoff_field(FieldSpec::choice("customer_type", CUSTOMER_TYPES))
        .handoff_field(FieldSpec::choice("customer_category", CUSTOMER_CATEGORIES))
        .handoff_field(FieldSpec::list("reform_areas"))
        .handoff_field(FieldSpec::amount("budget"))
        .bind_query("project", "project_id")
        .bind_query("customerType", "customer_type")
        .build()
}
