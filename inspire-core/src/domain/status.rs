//! Job status domain type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary status of a remote job
///
/// The remote API reports status as free text. Anything it sends that is not
/// one of the known values is folded into [`JobStatus::Unknown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Parse a status string as sent by the remote API
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether no further transitions can happen from this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Marker used when rendering notifications
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Pending => "⏳",
            Self::Running => "🏃",
            Self::Succeeded => "✅",
            Self::Failed => "❌",
            Self::Cancelled => "🛑",
            Self::Unknown => "❓",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
