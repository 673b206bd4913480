//! API error type and response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use warden_ingest::IngestError;
use warden_moderation::ModerationError;
use warden_queue::QueueError;

/// Boundary error, mapped onto HTTP status codes.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Shared-secret check failed on a gated route
    #[error("unauthorized")]
    Unauthorized,

    /// Malformed or missing required field
    #[error("{0}")]
    Validation(String),

    /// Keyed lookup with no matching record
    #[error("not found")]
    NotFound,

    /// The durable store could not be reached or a write failed;
    /// retryable by the caller
    #[error("store unavailable: {0}")]
    Store(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Store(reason) = &self {
            tracing::error!(%reason, "Store failure surfaced to caller");
        }
        let body = json!({"ok": false, "error": self.to_string()});
        (self.status(), Json(body)).into_response()
    }
}

impl From<warden_database::DatabaseError> for ApiError {
    fn from(e: warden_database::DatabaseError) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<QueueError> for ApiError {
    fn from(e: QueueError) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Validation(msg) => Self::Validation(msg),
            IngestError::Database(e) => Self::Store(e.to_string()),
        }
    }
}

impl From<ModerationError> for ApiError {
    fn from(e: ModerationError) -> Self {
        match e {
            ModerationError::Validation(msg) => Self::Validation(msg),
            ModerationError::Database(e) => Self::Store(e.to_string()),
        }
    }
}
