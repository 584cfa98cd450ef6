//! Authentication DTOs

use serde::{Deserialize, Serialize};

use super::lenient;

/// Body of `POST /auth/token`
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// `data` payload of a successful token response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenData {
    pub access_token: String,
    /// Lifetime of the token in seconds, when reported
    #[serde(default, deserialize_with = "lenient::integer")]
    pub expires_in: Option<i64>,
}
