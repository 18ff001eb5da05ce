//! Error types for the distiller
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::remote::RemoteError;

// == Distiller Error Enum ==
/// Unified error type for the cache engine and its HTTP surface.
#[derive(Error, Debug)]
pub enum DistillerError {
    /// Malformed content address
    #[error("Invalid content address: {0}")]
    Parse(String),

    /// Address names a source system with no registered backend
    #[error("Unknown source system: {0}")]
    UnknownSourceSystem(String),

    /// Remote fetch failed and no cached payload exists to fall back to
    #[error("Failed to retrieve {address} (not cached and unavailable remotely): {reason}")]
    PersistentFetchFailure { address: String, reason: String },

    /// Optimistic-concurrency collision on write
    #[error("Revision conflict on record: {0}")]
    Conflict(String),

    /// Raw post carries neither author+permlink nor an address
    #[error("Invalid post data: {0}")]
    InvalidPost(String),

    /// Error returned by a remote source, propagated verbatim
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Malformed query parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for DistillerError {
    fn into_response(self) -> Response {
        let status = match &self {
            DistillerError::Parse(_)
            | DistillerError::UnknownSourceSystem(_)
            | DistillerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DistillerError::PersistentFetchFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
            DistillerError::Conflict(_) => StatusCode::CONFLICT,
            DistillerError::InvalidPost(_) | DistillerError::Remote(_) => StatusCode::BAD_GATEWAY,
            DistillerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the distiller.
pub type Result<T> = std::result::Result<T, DistillerError>;
