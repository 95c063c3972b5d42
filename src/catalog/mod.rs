pub mod additional_order;
pub mod consent;
pub mod hearing;
pub mod survey;

use std::sync::Arc;
use strum::IntoEnumIterator;

use crate::error::{CatalogError, Result};
use crate::procedure::Procedure;

/// The built-in procedures.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
    clap::ValueEnum,
)]
#[strum(serialize_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum ProcedureKind {
    Hearing,
    AdditionalOrder,
    CancellationConsent,
    ChangeConsent,
    RatificationConsent,
    CompletionSurvey,
}

impl ProcedureKind {
    pub fn procedure(self) -> std::result::Result<Procedure, CatalogError> {
        match self {
            Self::Hearing => hearing::procedure(),
            Self::AdditionalOrder => additional_order::procedure(),
            Self::CancellationConsent => consent::cancellation(),
            Self::ChangeConsent => consent::change(),
            Self::RatificationConsent => consent::ratification(),
            Self::CompletionSurvey => survey::procedure(),
        }
    }

    /// Route the second window is opened on.
    pub fn route(self) -> &'static str {
        match self {
            Self::Hearing => "/hearing",
            Self::AdditionalOrder => "/projects/additional-order",
            Self::CancellationConsent => "/consent/cancellation",
            Self::ChangeConsent => "/consent/change",
            Self::RatificationConsent => "/consent/ratification",
            Self::CompletionSurvey => "/survey",
        }
    }
}

/// Builds every catalog, failing on the first configuration conflict. Run
/// once at startup.
pub fn validate_all() -> Result<Vec<(ProcedureKind, Arc<Procedure>)>> {
    ProcedureKind::iter()
        .map(|kind| Ok((kind, Arc::new(kind.procedure()?))))
        .collect()
}
