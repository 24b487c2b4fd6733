//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use listing_extraction::ExtractionError;
use serde::Serialize;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An error returned from a handler as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        let status = match &err {
            ExtractionError::InvalidInput { .. } | ExtractionError::UnsupportedSource { .. } => {
                StatusCode::BAD_REQUEST
            }
            ExtractionError::FetchFailed { status, .. } => upstream_status(*status),
            ExtractionError::ConfigurationMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match err {
            // the upstream message is passed through as-is
            ExtractionError::FetchFailed { message, .. } if !message.is_empty() => message,
            other => other.to_string(),
        };
        Self { status, message }
    }
}

/// Upstream 4xx/5xx codes are passed through; anything else is a bad gateway.
fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error = %self.message, "Request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), error = %self.message, "Request rejected");
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
