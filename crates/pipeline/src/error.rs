//! Error types for the recommendation engine.

use thiserror::Error;

/// The engine has a single failure mode: it was handed input it refuses to
/// reason about. Callers turn this into a client-facing 400.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidInput(reason.into())
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
