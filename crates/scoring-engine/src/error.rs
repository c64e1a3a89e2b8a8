//! Scoring engine error types

use thiserror::Error;

/// Errors that can occur while applying a scoring command
///
/// Every command either applies in full or fails with one of these
/// variants and leaves the match untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// Malformed command (unknown team side, run value out of range, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Command not allowed in the current match state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Unknown match or player reference
    #[error("Not found: {0}")]
    NotFound(String),

    /// Undo requested with an empty history
    #[error("No history to undo")]
    NoHistory,

    /// The new state was computed but could not be persisted
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ScoringError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Short machine-readable label, used for metrics and API payloads
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::Validation(_) => "validation",
            ScoringError::InvalidState(_) => "invalid_state",
            ScoringError::NotFound(_) => "not_found",
            ScoringError::NoHistory => "no_history",
            ScoringError::Persistence(_) => "persistence",
        }
    }
}
