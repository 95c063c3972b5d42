use clap::{Parser, Subcommand};

use crate::catalog::ProcedureKind;

/// `renowiz` - guided-procedure engine for renovation back-office wizards.
#[derive(Parser, Debug)]
#[command(name = "renowiz")]
#[command(version = "0.1.0")]
#[command(about = "Step through and hand off renovation back-office procedures.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every procedure catalog and report configuration conflicts
    Check,

    /// Print the step list a procedure materializes for the given answers
    Steps {
        /// Procedure (hearing, change-consent, completion-survey, ...)
        kind: ProcedureKind,

        /// Answer as field=value (repeatable)
        #[arg(short, long = "answer", value_name = "FIELD=VALUE")]
        answers: Vec<String>,
    },

    /// Write, read or clear a cross-window handoff payload
    Handoff {
        #[command(subcommand)]
        handoff_command: HandoffCommands,
    },

    /// Step through a procedure interactively
    Walk {
        kind: ProcedureKind,

        /// Launch URL to resume from (reads the stored handoff payload)
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum HandoffCommands {
    /// Store a payload and print the URL the second window should open
    Write {
        kind: ProcedureKind,

        /// Answer as field=value (repeatable)
        #[arg(short, long = "answer", value_name = "FIELD=VALUE")]
        answers: Vec<String>,

        /// Route override (defaults to the procedure's own route)
        #[arg(long)]
        route: Option<String>,
    },

    /// Print the payload a receiving window would start from
    Read {
        kind: ProcedureKind,

        /// Launch URL whose query parameters override the payload
        #[arg(long)]
        url: Option<String>,
    },

    /// Remove a stored payload
    Clear { kind: ProcedureKind },
}
