//! Error types and their HTTP rendering
//!
//! Every failure of a send attempt is one of four kinds. The `Display` output
//! of each variant is the bare, human-readable message so it can be shown to
//! the submitter as-is (`Missing SMTP username`, `Invalid token`, ...).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used for every CSRF token mismatch
pub const INVALID_TOKEN: &str = "Invalid token";

/// Failure of a mailer construction or send attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailerError {
    /// Bad construction input (credentials or recipient)
    #[error("{0}")]
    Config(String),

    /// Missing or malformed message fields
    #[error("{0}")]
    Validation(String),

    /// CSRF token mismatch
    #[error("{0}")]
    Security(String),

    /// SMTP-layer failure, carrying the transport's detail
    #[error("{0}")]
    Transport(String),
}

impl MailerError {
    /// Create a configuration error
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a security error
    #[must_use]
    pub fn security<T: Into<String>>(msg: T) -> Self {
        Self::Security(msg.into())
    }

    /// Create a transport error
    #[must_use]
    pub fn transport<T: Into<String>>(msg: T) -> Self {
        Self::Transport(msg.into())
    }

    /// The human-readable message carried by this error
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Config(msg)
            | Self::Validation(msg)
            | Self::Security(msg)
            | Self::Transport(msg) => msg,
        }
    }

    /// Short machine-friendly name of the error kind, used in logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Validation(_) => "validation",
            Self::Security(_) => "security",
            Self::Transport(_) => "transport",
        }
    }

    /// Status code used when the error is rendered outside Ajax mode
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Security(_) => StatusCode::FORBIDDEN,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Render the Ajax-mode failure: HTTP 400 with a JSON `{status, detail}` body
    #[must_use]
    pub fn into_ajax_response(self) -> Response {
        let body = ErrorBody::bad_request(self.message());
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Plain-text rendering, used when the caller lets the error propagate
impl IntoResponse for MailerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, self.message().to_string()).into_response()
    }
}

/// JSON error payload emitted in Ajax mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status repeated in the body (always 400 in Ajax mode)
    pub status: u16,
    /// Error message
    pub detail: String,
}

impl ErrorBody {
    /// Create a 400 body with the given detail
    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST.as_u16(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_message() {
        let err = MailerError::config("Missing SMTP username");
        assert_eq!(err.to_string(), "Missing SMTP username");
        assert_eq!(err.message(), "Missing SMTP username");
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            MailerError::config("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            MailerError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MailerError::security(INVALID_TOKEN).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            MailerError::transport("x").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_ajax_response_is_always_400() {
        let response = MailerError::transport("connection refused").into_ajax_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = MailerError::security(INVALID_TOKEN).into_ajax_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody::bad_request("Sender email address is invalid");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": 400, "detail": "Sender email address is invalid"})
        );
    }
}
