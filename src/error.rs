use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `renowiz`.
///
/// Library callers can match on these to decide recovery strategy; the CLI
/// and file-backed storage keep using `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum WizardError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Step catalog ────────────────────────────────────────────────────
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    // ── Handoff ─────────────────────────────────────────────────────────
    #[error("handoff: {0}")]
    Handoff(#[from] HandoffError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Catalog errors ──────────────────────────────────────────────────────────

/// Step-graph configuration conflicts. These are logic bugs in a catalog and
/// are raised when a procedure is constructed, never during navigation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("procedure {procedure} declares no base steps")]
    Empty { procedure: String },

    #[error("procedure {procedure} has a step with an empty id")]
    EmptyStepId { procedure: String },

    #[error("procedure {procedure} has duplicate step id: {step}")]
    DuplicateStep { procedure: String, step: String },

    #[error("rule {rule} anchors after unknown step: {anchor}")]
    UnknownAnchor { rule: String, anchor: String },

    #[error("rules {first} and {second} overlap at {anchor}")]
    OverlappingRules {
        first: String,
        second: String,
        anchor: String,
    },

    #[error("guard registered for unknown step: {step}")]
    UnknownGuardStep { step: String },

    #[error("handoff schema {key} declares field {field} twice")]
    DuplicateHandoffField { key: String, field: String },

    #[error("query parameter {param} binds undeclared handoff field: {field}")]
    UnboundQueryField { param: String, field: String },
}

// ─── Handoff errors ──────────────────────────────────────────────────────────

/// Failures while writing a handoff payload. Reads never surface errors.
#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("storage write for {key} failed: {message}")]
    Storage { key: String, message: String },

    #[error("handoff field {field} of {key} holds a value of the wrong kind: {value}")]
    FieldKind {
        key: String,
        field: String,
        value: String,
    },

    #[error("payload for {key} could not be serialized: {message}")]
    Serialize { key: String, message: String },

    #[error("launch url rejected: {0}")]
    LaunchUrl(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, WizardError>;
