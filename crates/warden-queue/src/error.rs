//! Queue error types.

use thiserror::Error;

/// Queue error type.
#[derive(Error, Debug)]
pub enum QueueError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] warden_database::DatabaseError),

    /// Command body could not be encoded for storage
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Result type alias using QueueError.
pub type QueueResult<T> = Result<T, QueueError>;
