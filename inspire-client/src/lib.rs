//! Inspire HTTP Client
//!
//! A small, type-safe client for the Inspire training platform API, limited
//! to what job monitoring needs: acquiring a bearer token and querying the
//! status of a job.
//!
//! Transient failures (timeouts, refused connections, 5xx responses) are
//! retried according to a [`RetryPolicy`]; everything else is reported
//! immediately.
//!
//! # Example
//!
//! ```no_run
//! use inspire_client::InspireClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), inspire_client::ClientError> {
//!     let mut client = InspireClient::new("https://qz.sii.edu.cn");
//!     client.authenticate("alice", "secret").await?;
//!
//!     let snapshot = client.fetch_job_status("job-1234").await?;
//!     println!("{} is {}", snapshot.job_id, snapshot.status);
//!     Ok(())
//! }
//! ```

mod auth;
pub mod error;
mod jobs;
pub mod retry;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use inspire_core::domain::Snapshot;
pub use retry::RetryPolicy;

use inspire_core::dto::ApiEnvelope;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://qz.sii.edu.cn";

/// HTTP client for the Inspire API
///
/// Holds the bearer token once [`InspireClient::authenticate`] succeeded;
/// every later request carries it.
#[derive(Debug, Clone)]
pub struct InspireClient {
    /// Base URL of the API (e.g., "https://qz.sii.edu.cn")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Retry behaviour for transient failures
    retry: RetryPolicy,
    /// Bearer token, set by a successful authentication
    token: Option<String>,
}

impl InspireClient {
    /// Create a new client with default HTTP settings
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use inspire_client::{InspireClient, DEFAULT_REQUEST_TIMEOUT};
    /// use reqwest::Client;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(DEFAULT_REQUEST_TIMEOUT)
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = InspireClient::with_client("https://qz.sii.edu.cn", http_client);
    /// assert!(!client.is_authenticated());
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::default(),
            token: None,
        }
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the retry policy in use
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Whether a bearer token is held
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    // =============================================================================
    // Request Helpers
    // =============================================================================

    /// Send one POST request and decode the response envelope
    ///
    /// This is a single attempt; callers wrap it in the retry policy.
    async fn post_envelope<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        debug!("POST {} -> {}", url, response.status());

        self.handle_response(response).await
    }

    /// Handle an API response and decode the envelope
    ///
    /// 5xx statuses become retryable [`ClientError::ServerError`]s, other
    /// non-success statuses become [`ClientError::ApplicationError`]s
    /// carrying the HTTP status, and bodies that are not an envelope become
    /// [`ClientError::ProtocolError`]s.
    async fn handle_response(&self, response: reqwest::Response) -> Result<ApiEnvelope> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.map_err(ClientError::from_reqwest)?;
            if status.is_server_error() {
                return Err(ClientError::ServerError {
                    status: status.as_u16(),
                    message: error_text,
                });
            }
            return Err(ClientError::application(
                i64::from(status.as_u16()),
                error_text,
            ));
        }

        let body = response.text().await.map_err(ClientError::from_reqwest)?;
        decode_envelope(&body)
    }
}

/// Parse a response body into an envelope that carries an application code
///
/// Only a JSON object is an envelope; arrays and scalars are rejected
/// rather than read field by field.
fn decode_envelope(body: &str) -> Result<ApiEnvelope> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ClientError::protocol(format!("Invalid JSON response: {}", e)))?;

    if !value.is_object() {
        return Err(ClientError::protocol("Response is not a JSON object"));
    }

    let envelope: ApiEnvelope = serde_json::from_value(value)
        .map_err(|e| ClientError::protocol(format!("Malformed response envelope: {}", e)))?;

    if envelope.code.is_none() {
        return Err(ClientError::protocol("Response has no application code"));
    }

    Ok(envelope)
}
