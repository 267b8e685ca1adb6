//! Gateway error types.
//!
//! [`GatewayError`] is returned by HTTP handlers and maps to a status code
//! plus a structured JSON body. [`TransportError`] scopes failures to a
//! single client connection: every variant ends that client's session.
//! [`ConfigError`] is raised only at startup.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: client id exceeds 128 characters",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// HTTP-facing error enum with status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status               |
/// |-----------|------------|---------------------------|
/// | 1000–1999 | Validation | 400 Bad Request           |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Connect request failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Failure on a single client connection.
///
/// Never retried. The receive loop treats any of these as the end of the
/// session and runs teardown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed, locally or by the peer.
    #[error("connection closed")]
    Closed,

    /// Writing to the connection failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Reading from the connection failed.
    #[error("receive failed: {0}")]
    Receive(String),

    /// An inbound frame was not a JSON object of string values.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Startup configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable was set to a value that cannot be used.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Environment variable name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
