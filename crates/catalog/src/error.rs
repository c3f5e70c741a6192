//! Error types for the catalog crate.
//!
//! Loading errors carry the file and line they came from. Mutation errors
//! (`Validation`, `Conflict`, `NotFound`) are the rules the catalog enforces
//! as the owner of activity and preference records.

use thiserror::Error;

/// Errors that can occur while loading or mutating the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a catalog file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., preference for a missing activity)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },

    /// A create or update request broke a record invariant
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A uniqueness rule was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The addressed record does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },
}

impl CatalogError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        CatalogError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
