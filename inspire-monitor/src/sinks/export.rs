//! File export sink
//!
//! Keeps a JSON record of the session on disk. Every write replaces the
//! whole file with the current history: the document is written to a
//! temporary file in the same directory and renamed over the destination,
//! so a complete earlier version is never replaced by a truncated one.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use inspire_core::domain::{JobStatus, Snapshot};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Report, ReportSink, SessionRecord};
use crate::error::SinkError;
use crate::session::{SessionContext, Termination};

/// Session settings as recorded in the export (secrets left out)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedConfig {
    pub job_id: String,
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
    pub export_file: Option<PathBuf>,
    pub notifications_enabled: bool,
    pub notification_target: Option<String>,
}

impl ExportedConfig {
    fn from_session(session: &SessionContext) -> Self {
        let config = &session.config;
        Self {
            job_id: config.job_id.clone(),
            poll_interval_secs: config.poll_interval.as_secs(),
            timeout_secs: config.timeout.as_secs(),
            export_file: config.export_path.clone(),
            notifications_enabled: config.notification.is_some(),
            notification_target: config.notification.as_ref().map(|n| n.target()),
        }
    }
}

/// Derived figures about the recorded history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Local>,
    pub total_snapshots: usize,
    pub monitoring_duration_secs: u64,
    pub last_snapshot_at: Option<DateTime<Local>>,
    pub final_status: Option<JobStatus>,
    /// Set once the session has terminated
    pub termination: Option<Termination>,
}

/// The exported document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub config: ExportedConfig,
    pub snapshots: Vec<Snapshot>,
    pub summary: ExportSummary,
}

impl ExportDocument {
    pub fn build(
        session: &SessionContext,
        history: &[Snapshot],
        elapsed: Duration,
        termination: Option<Termination>,
    ) -> Self {
        let last = history.last();
        Self {
            config: ExportedConfig::from_session(session),
            snapshots: history.to_vec(),
            summary: ExportSummary {
                session_id: session.session_id,
                started_at: session.started_at,
                total_snapshots: history.len(),
                monitoring_duration_secs: elapsed.as_secs(),
                last_snapshot_at: last.map(|s| s.captured_at),
                final_status: last.map(|s| s.status),
                termination,
            },
        }
    }
}

/// Writes the session record to a JSON file
#[derive(Debug, Clone)]
pub struct ExportSink {
    path: PathBuf,
}

impl ExportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Replace the export file with `document`
    pub async fn write(&self, document: &ExportDocument) -> Result<(), SinkError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let temp = self.temp_path();

        if let Err(source) = tokio::fs::write(&temp, &bytes).await {
            return Err(SinkError::Export {
                path: temp,
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(SinkError::Export {
                path: self.path.clone(),
                source,
            });
        }

        debug!(
            "Wrote {} snapshot(s) to {}",
            document.summary.total_snapshots,
            self.path.display()
        );
        Ok(())
    }

    /// Read a previously written export file
    pub async fn read(path: &Path) -> Result<ExportDocument, SinkError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| SinkError::Export {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "export.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl ReportSink for ExportSink {
    fn name(&self) -> &'static str {
        "export"
    }

    async fn report(&self, report: &Report<'_>) -> Result<(), SinkError> {
        let document = ExportDocument::build(report.session, report.history, report.elapsed, None);
        self.write(&document).await
    }

    async fn finish(&self, record: &SessionRecord<'_>) -> Result<(), SinkError> {
        let document = ExportDocument::build(
            record.session,
            record.history,
            record.elapsed,
            Some(record.termination),
        );
        self.write(&document).await?;
        info!("Monitoring data exported to: {}", self.path.display());
        Ok(())
    }
}
