//! Server error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rollcall_common::RollcallError;
use serde::Serialize;
use tracing::{error, warn};

/// Startup and lifecycle errors.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    /// Configuration or record-source setup failed.
    #[error("Setup error: {0}")]
    Setup(#[from] RollcallError),

    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the server.
pub type ServerResult<T> = Result<T, ServerError>;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub details: String,
}

/// A request failure ready to be rendered as JSON.
#[derive(Debug)]
pub struct ApiError(pub RollcallError);

impl From<RollcallError> for ApiError {
    fn from(err: RollcallError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = if self.0.is_client_error() {
            warn!(error = %self.0, "Rejected analytics request");
            (StatusCode::BAD_REQUEST, "Invalid request parameters")
        } else {
            error!(error = %self.0, "Analytics request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to compute attendance analytics")
        };

        let body = ErrorBody {
            success: false,
            error: error.to_string(),
            details: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
