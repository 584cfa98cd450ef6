//! Wire DTOs for the remote job API
//!
//! The remote side is not fully under our control: numeric fields show up
//! both as JSON numbers and as strings, and any field may be missing or
//! null. The [`lenient`] helpers absorb those differences so a single odd
//! field never fails a whole poll.

pub mod auth;
pub mod envelope;
pub mod job;

pub use envelope::ApiEnvelope;

pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Accepts a string or a number, yielding its text
    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Array(_) | Value::Object(_) => None,
        })
    }

    /// Accepts an integer, a float or a numeric string
    pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => parse_integer(&s),
            _ => None,
        })
    }

    pub fn parse_integer(raw: &str) -> Option<i64> {
        let raw = raw.trim();
        raw.parse::<i64>()
            .ok()
            .or_else(|| raw.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
    }
}
