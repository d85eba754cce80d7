//! Error types for application scoring

use thiserror::Error;

/// Errors surfaced while turning an application into a verdict.
///
/// All variants are local and recoverable: the caller reports them and keeps
/// running. Retrying with the same input yields the same error.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// A numeric field is outside its accepted domain
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A categorical label is not part of its encoder's vocabulary
    #[error("unknown category {label:?} for {field}")]
    UnknownCategory { field: String, label: String },

    /// A serialized artifact could not be read or is malformed
    #[error("artifact error: {0}")]
    Artifact(String),

    /// The classifier failed to produce a label
    #[error("inference failed: {0}")]
    Inference(String),
}

impl ScoringError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoringError>;
