//! Error types surfaced at the resolution boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::ports::TrackerError;

/// Errors that can end a resolution run.
///
/// Each variant maps to exactly one HTTP status; nothing is retried and no
/// partial result is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A required request parameter is missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The tracker rejected the credentials.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The tracker failed during the run.
    #[error("tracker unavailable: {0}")]
    Upstream(String),
}

impl ResolveError {
    /// Returns the HTTP status code for this error.
    ///
    /// - Invalid request: 400 Bad Request
    /// - Permission denied: 403 Forbidden
    /// - Upstream: 502 Bad Gateway
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<TrackerError> for ResolveError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Unauthorized(msg) => Self::PermissionDenied(msg),
            TrackerError::Unavailable(msg) => Self::Upstream(msg),
        }
    }
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
