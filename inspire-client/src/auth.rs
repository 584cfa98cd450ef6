//! Authentication endpoint

use inspire_core::dto::auth::{TokenData, TokenRequest};
use tracing::info;

use crate::InspireClient;
use crate::error::{ClientError, Result};

const AUTH_TOKEN_PATH: &str = "/auth/token";

impl InspireClient {
    /// Acquire a bearer token with username and password
    ///
    /// The token is kept for the lifetime of the client and attached to all
    /// later requests. Any failure, including exhausted retries, is reported
    /// as [`ClientError::Authentication`].
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "username cannot be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(ClientError::InvalidRequest(
                "password cannot be empty".to_string(),
            ));
        }

        let request = TokenRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let envelope = self
            .retry
            .run("Authentication request", |_| {
                self.post_envelope(AUTH_TOKEN_PATH, &request)
            })
            .await
            .map_err(|e| match e {
                ClientError::ApplicationError { message, .. } => {
                    ClientError::Authentication(message)
                }
                other => ClientError::Authentication(other.to_string()),
            })?;

        if !envelope.is_success() {
            return Err(ClientError::Authentication(envelope.message_or_default()));
        }

        let data = envelope
            .data
            .ok_or_else(|| ClientError::Authentication("response has no token data".to_string()))?;
        let token: TokenData = serde_json::from_value(data)
            .map_err(|e| ClientError::Authentication(format!("malformed token data: {}", e)))?;

        match token.expires_in {
            Some(secs) => info!("Authentication successful, token expires in {}s", secs),
            None => info!("Authentication successful"),
        }

        self.token = Some(token.access_token);
        Ok(())
    }
}
