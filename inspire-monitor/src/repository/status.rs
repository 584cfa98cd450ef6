//! Status repository

use async_trait::async_trait;
use inspire_client::{ClientError, InspireClient};
use inspire_core::domain::Snapshot;

/// Source of job status snapshots
#[async_trait]
pub trait StatusRepository: Send + Sync {
    /// Fetches the current status of a job
    ///
    /// Transient failures are expected to be retried by the implementation;
    /// the error returned here is final for this poll.
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    async fn fetch(&self, job_id: &str) -> Result<Snapshot, ClientError>;
}

#[async_trait]
impl StatusRepository for InspireClient {
    async fn fetch(&self, job_id: &str) -> Result<Snapshot, ClientError> {
        self.fetch_job_status(job_id).await
    }
}
