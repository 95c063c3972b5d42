use crate::error::CatalogError;
use crate::handoff::FieldSpec;
use crate::procedure::{Guard, Procedure, steps};

pub const KEY: &str = "additional-order";

/// Additional order placed against a running project, usually opened from
/// the project screen in a second window.
pub fn procedure() -> Result<Procedure, CatalogError> {
    Procedure::builder(KEY)
        .title("Additional order")
        .base(steps(&[
            ("order-items", "Order items"),
            ("amount", "Amount"),
            ("delivery", "Delivery"),
            ("signature", "Signature"),
            ("complete", "Complete"),
        ]))
        .guard("order-items", Guard::filled("order_items"))
        .guard("amount", Guard::filled("order_description"))
        .guard("amount", Guard::positive_amount("amount"))
        .guard("signature", Guard::signature("has_signature"))
        .handoff_field(FieldSpec::text("project_id"))
        .handoff_field(FieldSpec::text("customer_name"))
        .handoff_field(FieldSpec::list("order_items"))
        .handoff_field(FieldSpec::text("order_description"))
        .handoff_field(FieldSpec::amount("amount"))
        .handoff_field(FieldSpec::text("delivery_date"))
        .bind_query("project", "project_id")
        .build()
}
