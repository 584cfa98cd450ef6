//! Error types for the monitor
//!
//! Only [`MonitorError`] is ever fatal, and only before polling starts.
//! Failures met while a session runs are logged and absorbed.

use inspire_client::ClientError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a session before its first poll
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Session parameters are out of range
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    Authentication(#[source] ClientError),
}

impl MonitorError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Errors raised by reporting sinks
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing the export file failed
    #[error("Failed to export monitoring data to {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the export document failed
    #[error("Failed to serialize monitoring data: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The notification request could not be sent
    #[error("Failed to send notification: {0}")]
    NotificationRequest(#[from] reqwest::Error),

    /// The notification target refused the message
    #[error("Notification rejected (status {status}): {message}")]
    NotificationRejected { status: u16, message: String },
}
