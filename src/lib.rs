#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod handoff;
pub mod procedure;
pub mod ui;

pub use config::Config;
pub use error::{CatalogError, ConfigError, HandoffError, Result, WizardError};
pub use handoff::{HandoffStore, LaunchParams, LaunchRequest};
pub use procedure::{AnswerState, Procedure, ProcedureController, ProcedureEvent, Step};
