//! Error taxonomy for the gate.

/// Errors produced while building a changeset or probing collaborators.
///
/// `BaseNotFound` and `Git` during changeset construction are fatal: there is
/// nothing to evaluate. Every other error raised inside a rule's `evaluate` is
/// downgraded to that rule's failed verdict by the rule itself.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("cannot resolve base reference: {base_ref}")]
    BaseNotFound { base_ref: String },

    #[error("git error: {0}")]
    Git(String),

    #[error("artifact regeneration failed: {0}")]
    Regen(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;
