//! Moderation error types.

use thiserror::Error;

/// Moderation error type.
#[derive(Error, Debug)]
pub enum ModerationError {
    /// Malformed or missing required field, rejected before any store
    /// interaction
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] warden_database::DatabaseError),
}

/// Result type alias using ModerationError.
pub type ModerationResult<T> = Result<T, ModerationError>;
