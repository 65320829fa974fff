//! Unified error types for Courier-Oxide

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Courier-Oxide
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors (connection, timeout, invalid URL)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-2xx HTTP response from the service
    #[error("Transport error: status {status}: {body}")]
    Transport { status: u16, body: String },

    /// No free worker slot at session creation time
    #[error("Concurrency limit exceeded: {0}")]
    ConcurrencyLimitExceeded(String),

    /// Session not found or expired
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Missing or wrong API key
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid request option
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Unknown method path
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Element not found in page
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Debug artifact could not be decoded
    #[error("Malformed artifact: {0}")]
    MalformedArtifact(String),

    /// Page backend errors
    #[error("Backend error: {0}")]
    Backend(String),

    /// Navigation failed
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new HTTP client error
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Error::Http(msg.into())
    }

    /// Create a new concurrency limit error
    pub fn concurrency_limit<S: Into<String>>(msg: S) -> Self {
        Error::ConcurrencyLimitExceeded(msg.into())
    }

    /// Create a new session not found error
    pub fn session_not_found<S: Into<String>>(id: S) -> Self {
        Error::SessionNotFound(id.into())
    }

    /// Create a new unauthorized error
    pub fn unauthorized<S: Into<String>>(msg: S) -> Self {
        Error::Unauthorized(msg.into())
    }

    /// Create a new invalid option error
    pub fn invalid_option<S: Into<String>>(msg: S) -> Self {
        Error::InvalidOption(msg.into())
    }

    /// Create a new unknown method error
    pub fn unknown_method<S: Into<String>>(method: S) -> Self {
        Error::UnknownMethod(method.into())
    }

    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(selector: S) -> Self {
        Error::ElementNotFound(selector.into())
    }

    /// Create a new malformed artifact error
    pub fn malformed_artifact<S: Into<String>>(msg: S) -> Self {
        Error::MalformedArtifact(msg.into())
    }

    /// Create a new backend error
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Error::Backend(msg.into())
    }

    /// Create a new navigation failed error
    pub fn navigation_failed<S: Into<String>>(msg: S) -> Self {
        Error::NavigationFailed(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// HTTP status code the service reports for this error.
    ///
    /// 404 is reserved for missing/expired sessions and 429 for pool
    /// saturation so clients can classify failures from the status alone.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Error::ConcurrencyLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::InvalidOption(_)
            | Error::UnknownMethod(_)
            | Error::ElementNotFound(_)
            | Error::Serialization(_) => StatusCode::BAD_REQUEST,
            Error::NavigationFailed(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert Error to an HTTP error response (plain text body)
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
