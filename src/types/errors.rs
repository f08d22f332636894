//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. Every error is handled at the handler
//! boundary: converted to an HTTP status plus a human-readable message, logged
//! once, and never retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the translator.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing input fields (caller's fault, maps to 400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing operational configuration (operator's fault, maps to 500).
    #[error("configuration error: {0}")]
    Config(String),

    /// The job-execution API rejected or failed the call (maps to 500).
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Serialization/deserialization errors (maps to 400).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to the HTTP status returned to the trigger source.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::Serialization(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) | Error::Upstream(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }
}

// Implement IntoResponse to enable ? in axum handlers: each error becomes
// (status, message) and is logged once at the boundary.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Validation(msg) => tracing::warn!("request rejected: {}", msg),
            Error::Serialization(e) => tracing::warn!("request rejected: {}", e),
            Error::Config(msg) => tracing::error!("configuration incomplete: {}", msg),
            Error::Upstream(msg) => tracing::error!("upstream call failed: {}", msg),
            Error::Io(e) => tracing::error!("io error: {}", e),
        }
        (self.http_status(), self.to_string()).into_response()
    }
}
