//! Error handling module for the CRM client.
//!
//! Provides a single error type with stable codes, and conversions from the HTTP,
//! storage and JSON layers.

use serde::Deserialize;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INVALID_TRANSITION: &str = "INVALID_TRANSITION";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
}

/// Client error type.
#[derive(Debug)]
pub enum CrmError {
    /// A required field was missing; raised before any request is sent
    Validation(String),
    /// Missing or rejected bearer credential
    Authorization(String),
    /// Request failed, timed out, or the server answered with a failure status
    Network(String),
    /// Unknown identifier, locally or remotely
    NotFound(String),
    /// A named status operation is not valid from the lead's current status
    InvalidTransition(String),
    /// Session database error
    Storage(String),
    /// Unexpected payload shape
    Decode(String),
}

impl CrmError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CrmError::Validation(_) => codes::VALIDATION_ERROR,
            CrmError::Authorization(_) => codes::UNAUTHORIZED,
            CrmError::Network(_) => codes::NETWORK_ERROR,
            CrmError::NotFound(_) => codes::NOT_FOUND,
            CrmError::InvalidTransition(_) => codes::INVALID_TRANSITION,
            CrmError::Storage(_) => codes::STORAGE_ERROR,
            CrmError::Decode(_) => codes::DECODE_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            CrmError::Validation(msg)
            | CrmError::Authorization(msg)
            | CrmError::Network(msg)
            | CrmError::NotFound(msg)
            | CrmError::InvalidTransition(msg)
            | CrmError::Storage(msg)
            | CrmError::Decode(msg) => msg,
        }
    }

    /// Whether the caller should drop the session and send the user back to sign-in.
    pub fn is_authorization(&self) -> bool {
        matches!(self, CrmError::Authorization(_))
    }

    /// Map a non-success HTTP status (plus the server's message, if any) to an error.
    pub fn from_status(status: reqwest::StatusCode, server_message: Option<String>) -> Self {
        let message =
            server_message.unwrap_or_else(|| format!("Request failed with status {}", status));
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                CrmError::Authorization(message)
            }
            reqwest::StatusCode::NOT_FOUND => CrmError::NotFound(message),
            reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
                CrmError::Validation(message)
            }
            _ => CrmError::Network(message),
        }
    }
}

impl std::fmt::Display for CrmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for CrmError {}

impl From<reqwest::Error> for CrmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return CrmError::Decode(format!("Unexpected response body: {}", err));
        }
        if let Some(status) = err.status() {
            return CrmError::from_status(status, None);
        }
        if err.is_timeout() {
            return CrmError::Network(format!("Request timed out: {}", err));
        }
        CrmError::Network(format!("Request failed: {}", err))
    }
}

impl From<sqlx::Error> for CrmError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Session storage error: {:?}", err);
        CrmError::Storage(format!("Session storage error: {}", err))
    }
}

impl From<serde_json::Error> for CrmError {
    fn from(err: serde_json::Error) -> Self {
        CrmError::Decode(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for CrmError {
    fn from(err: std::io::Error) -> Self {
        CrmError::Storage(format!("I/O error: {}", err))
    }
}

/// Error body returned by the CRM API, e.g. `{ "message": "Invalid credentials" }`.
#[derive(Debug, Deserialize)]
pub struct ServerErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Result alias used throughout the crate.
pub type CrmResult<T> = Result<T, CrmError>;
