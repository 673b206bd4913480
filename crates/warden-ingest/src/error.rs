//! Ingestion error types.

use thiserror::Error;

/// Ingestion error type.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Malformed or missing required field, rejected before any store
    /// interaction
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] warden_database::DatabaseError),
}

/// Result type alias using IngestError.
pub type IngestResult<T> = Result<T, IngestError>;
