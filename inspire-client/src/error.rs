//! Error types for the Inspire client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the Inspire API
#[derive(Debug, Error)]
pub enum ClientError {
    /// A status request was issued before authentication succeeded
    #[error("Not authenticated, call authenticate() first")]
    NotAuthenticated,

    /// The request was rejected locally before being sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Credentials were rejected or the token request failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server could not be reached
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server answered with a 5xx status
    #[error("Server error (status {status}): {message}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// Transient failures persisted through every retry attempt
    #[error("Request failed after {attempts} attempt(s): {message}")]
    TransientFailure {
        /// Number of attempts made
        attempts: u32,
        /// Description of the last failure
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    ProtocolError(String),

    /// Well-formed response carrying a non-success code
    #[error("API error (code {code}): {message}")]
    ApplicationError {
        /// Application or HTTP status code
        code: i64,
        /// Error message from the API
        message: String,
    },

    /// Any other HTTP client failure
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),
}

impl ClientError {
    /// Create an application error from a code and message
    pub fn application(code: i64, message: impl Into<String>) -> Self {
        Self::ApplicationError {
            code,
            message: message.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError(message.into())
    }

    /// Classify a reqwest error into the client taxonomy
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() || error.is_request() || error.is_body() {
            // Refused, reset or closed before a complete response arrived
            Self::Connection(error.to_string())
        } else if error.is_decode() {
            Self::ProtocolError(error.to_string())
        } else {
            Self::RequestFailed(error)
        }
    }

    /// Check if this error is worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::ServerError { .. }
        )
    }
}
