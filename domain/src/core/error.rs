//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("no outputs")]
    NoOutputs,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid option {field}: {reason}")]
    InvalidOption { field: &'static str, reason: String },
}

impl DomainError {
    /// Check if this error is the pipeline-fatal "no outputs" condition
    pub fn is_no_outputs(&self) -> bool {
        matches!(self, DomainError::NoOutputs)
    }
}
