//! Job detail DTOs

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::domain::{JobStatus, Snapshot, Timeline};

/// Body of `POST /openapi/v1/train_job/detail`
#[derive(Debug, Clone, Serialize)]
pub struct JobDetailRequest {
    pub job_id: String,
}

/// `data` payload of a job detail response
///
/// Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobDetail {
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub sub_status: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub sub_msg: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub running_time_ms: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub timeline: Option<TimelineDetail>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub node_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub priority: Option<i64>,
}

/// Timeline block of a job detail response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineDetail {
    #[serde(default, deserialize_with = "lenient::string")]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub resource_prepared: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub run: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub finished: Option<String>,
}

impl From<TimelineDetail> for Timeline {
    fn from(detail: TimelineDetail) -> Self {
        Self {
            created: detail.created,
            resource_prepared: detail.resource_prepared,
            run: detail.run,
            finished: detail.finished,
        }
    }
}

impl JobDetail {
    /// Builds the snapshot for this response, filling defaults for
    /// missing fields
    pub fn into_snapshot(self, job_id: impl Into<String>, captured_at: DateTime<Local>) -> Snapshot {
        Snapshot {
            captured_at,
            job_id: job_id.into(),
            status: self
                .status
                .as_deref()
                .map(JobStatus::parse)
                .unwrap_or_default(),
            sub_status: self.sub_status.unwrap_or(0),
            sub_msg: self.sub_msg.unwrap_or_default(),
            running_time_ms: self
                .running_time_ms
                .and_then(|ms| u64::try_from(ms).ok())
                .unwrap_or(0),
            created_at: self.created_at.unwrap_or_default(),
            finished_at: self.finished_at.filter(|f| !f.is_empty()),
            timeline: self.timeline.map(Timeline::from),
            node_count: self
                .node_count
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            priority: self.priority.unwrap_or(0),
        }
    }
}
