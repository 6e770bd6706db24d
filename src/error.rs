//! Error types and handling for the `ClimaCerto` service

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the `ClimaCerto` service
///
/// Every failure that can cross the HTTP boundary is one of these
/// variants; [`ClimaCertoError::status_code`] defines the mapping to a
/// response status.
#[derive(Error, Debug)]
pub enum ClimaCertoError {
    /// The caller's input is missing or out of range
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The requested resource does not exist upstream
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// An upstream service could not be reached or refused the request
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// An upstream service answered with a payload we cannot interpret
    #[error("Upstream malformed: {message}")]
    UpstreamMalformed { message: String },

    /// Configuration or rules document errors, fatal at startup
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Anything else that went wrong inside the service
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ClimaCertoError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new upstream-unavailable error
    pub fn upstream_unavailable<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Create a new upstream-malformed error
    pub fn upstream_malformed<S: Into<String>>(message: S) -> Self {
        Self::UpstreamMalformed {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for the errors that must stop a provider fallback chain
    /// instead of letting the next provider run
    #[must_use]
    pub fn is_definitive(&self) -> bool {
        matches!(
            self,
            ClimaCertoError::Validation { .. } | ClimaCertoError::NotFound { .. }
        )
    }

    /// True when the caller may retry the same request later
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClimaCertoError::UpstreamUnavailable { .. })
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ClimaCertoError::Validation { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            ClimaCertoError::NotFound { .. } => StatusCode::NOT_FOUND,

            // 503 Service Unavailable
            ClimaCertoError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            ClimaCertoError::UpstreamMalformed { .. }
            | ClimaCertoError::Config { .. }
            | ClimaCertoError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the reason phrase used as the `error` field on the wire
    #[must_use]
    pub fn error_label(&self) -> &'static str {
        self.status_code().canonical_reason().unwrap_or("Error")
    }

    /// Get the message as it should appear on the wire, without the
    /// category prefix used for logging
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            ClimaCertoError::Validation { message }
            | ClimaCertoError::NotFound { message }
            | ClimaCertoError::UpstreamUnavailable { message }
            | ClimaCertoError::UpstreamMalformed { message }
            | ClimaCertoError::Config { message }
            | ClimaCertoError::Internal { message } => message,
        }
    }
}

/// JSON body returned for every failed request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

impl IntoResponse for ClimaCertoError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("{self}");
        }
        let body = ErrorBody {
            status_code: status.as_u16(),
            error: self.error_label().to_string(),
            message: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let validation_err = ClimaCertoError::validation("missing date");
        assert!(matches!(
            validation_err,
            ClimaCertoError::Validation { .. }
        ));

        let not_found_err = ClimaCertoError::not_found("no such place");
        assert!(matches!(not_found_err, ClimaCertoError::NotFound { .. }));

        let upstream_err = ClimaCertoError::upstream_unavailable("connection refused");
        assert!(matches!(
            upstream_err,
            ClimaCertoError::UpstreamUnavailable { .. }
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ClimaCertoError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ClimaCertoError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ClimaCertoError::upstream_unavailable("x").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ClimaCertoError::upstream_malformed("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ClimaCertoError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_definitive_errors_stop_fallback() {
        assert!(ClimaCertoError::validation("x").is_definitive());
        assert!(ClimaCertoError::not_found("x").is_definitive());
        assert!(!ClimaCertoError::upstream_unavailable("x").is_definitive());
        assert!(!ClimaCertoError::upstream_malformed("x").is_definitive());
    }

    #[test]
    fn test_error_labels() {
        assert_eq!(ClimaCertoError::validation("x").error_label(), "Bad Request");
        assert_eq!(ClimaCertoError::not_found("x").error_label(), "Not Found");
        assert_eq!(
            ClimaCertoError::upstream_unavailable("x").error_label(),
            "Service Unavailable"
        );
        assert_eq!(
            ClimaCertoError::upstream_malformed("x").error_label(),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_only_upstream_unavailable_is_retryable() {
        assert!(ClimaCertoError::upstream_unavailable("x").is_retryable());
        assert!(!ClimaCertoError::validation("x").is_retryable());
        assert!(!ClimaCertoError::upstream_malformed("x").is_retryable());
    }

    #[test]
    fn test_wire_message_has_no_prefix() {
        let err = ClimaCertoError::validation("The 'date' parameter is required.");
        assert_eq!(err.message(), "The 'date' parameter is required.");
        assert!(err.to_string().starts_with("Invalid input:"));
    }
}
