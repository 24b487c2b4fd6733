//! Typed errors for the listing extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Missing fields are not errors. A record with empty fields is reported
//! through [`ExtractionStatus::Partial`](crate::types::listing::ExtractionStatus).

use thiserror::Error;

/// Errors that abort an extraction request.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Missing or malformed URL
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Host is not on the marketplace allow-list
    #[error("unsupported source: {host} is not a supported marketplace")]
    UnsupportedSource { host: String },

    /// Primary fetch rejected (non-2xx) or unreachable (status 0)
    #[error("fetch failed ({status}): {message}")]
    FetchFailed { status: u16, message: String },

    /// Required setting absent (e.g. rendering proxy API key)
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),
}

impl ExtractionError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether the caller sent something we can never serve.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::UnsupportedSource { .. })
    }
}

/// Errors raised by a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, TLS, timeout or body read failure
    #[error("transport error: {message}")]
    Transport { message: String },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    /// HTTP status carried by the error, 0 when the request never completed.
    pub fn status(&self) -> u16 {
        match self {
            Self::Status { status, .. } => *status,
            Self::Transport { .. } | Self::Client(_) => 0,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport {
            message: e.to_string(),
        }
    }
}

impl From<FetchError> for ExtractionError {
    fn from(e: FetchError) -> Self {
        let status = e.status();
        let message = match e {
            FetchError::Status { message, .. } => message,
            FetchError::Transport { message } => message,
            FetchError::Client(message) => message,
        };
        ExtractionError::FetchFailed { status, message }
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_keeps_upstream_status() {
        let err: ExtractionError = FetchError::Status {
            status: 403,
            message: "blocked".into(),
        }
        .into();

        match err {
            ExtractionError::FetchFailed { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "blocked");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transport_error_maps_to_status_zero() {
        let err: ExtractionError = FetchError::Transport {
            message: "connection reset".into(),
        }
        .into();

        assert!(matches!(err, ExtractionError::FetchFailed { status: 0, .. }));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_client_errors() {
        assert!(ExtractionError::invalid_input("no url").is_client_error());
        assert!(ExtractionError::UnsupportedSource {
            host: "example.com".into()
        }
        .is_client_error());
        assert!(!ExtractionError::ConfigurationMissing("key".into()).is_client_error());
    }
}
