//! Job status endpoint

use chrono::Local;
use inspire_core::domain::Snapshot;
use inspire_core::dto::job::{JobDetail, JobDetailRequest};
use tracing::debug;

use crate::InspireClient;
use crate::error::{ClientError, Result};

const JOB_DETAIL_PATH: &str = "/openapi/v1/train_job/detail";

impl InspireClient {
    /// Fetch the current status of a job
    ///
    /// # Arguments
    /// * `job_id` - The job identifier, must not be empty
    ///
    /// # Returns
    /// A snapshot captured now, with defaults for any missing field
    pub async fn fetch_job_status(&self, job_id: &str) -> Result<Snapshot> {
        if job_id.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "job_id cannot be empty".to_string(),
            ));
        }
        if !self.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }

        let request = JobDetailRequest {
            job_id: job_id.to_string(),
        };

        let envelope = self
            .retry
            .run("Job status request", |_| {
                self.post_envelope(JOB_DETAIL_PATH, &request)
            })
            .await?;

        if !envelope.is_success() {
            return Err(ClientError::application(
                envelope.code.unwrap_or_default(),
                envelope.message_or_default(),
            ));
        }

        let data = envelope
            .data
            .ok_or_else(|| ClientError::protocol("Job detail response has no data"))?;
        let detail: JobDetail = serde_json::from_value(data)
            .map_err(|e| ClientError::protocol(format!("Malformed job detail: {}", e)))?;

        let snapshot = detail.into_snapshot(job_id, Local::now());
        debug!(
            "Job {} status {} (sub_status {})",
            snapshot.job_id, snapshot.status, snapshot.sub_status
        );
        Ok(snapshot)
    }
}
