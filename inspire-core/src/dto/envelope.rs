//! Response envelope shared by every remote endpoint

use serde::Deserialize;
use serde_json::Value;

use super::lenient;

/// Application code the remote API uses for success
pub const SUCCESS_CODE: i64 = 0;

/// Top-level response shape: `{ "code": 0, "message": "...", "data": {...} }`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub code: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    pub fn is_success(&self) -> bool {
        self.code == Some(SUCCESS_CODE)
    }

    /// Message text, or a generic placeholder when the API sent none
    pub fn message_or_default(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}
