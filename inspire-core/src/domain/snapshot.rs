//! Status snapshot domain types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::status::JobStatus;

/// One observation of a remote job, taken at `captured_at`
///
/// Snapshots are built once per successful poll and never modified
/// afterwards. Timestamps coming from the remote side are kept as the raw
/// millisecond-epoch text the API sent, so that malformed values can still
/// be displayed (as "Unknown") instead of failing the poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub captured_at: DateTime<Local>,
    pub job_id: String,
    pub status: JobStatus,
    pub sub_status: i64,
    pub sub_msg: String,
    pub running_time_ms: u64,
    pub created_at: String,
    pub finished_at: Option<String>,
    pub timeline: Option<Timeline>,
    pub node_count: u32,
    pub priority: i64,
}

impl Snapshot {
    /// Creates a snapshot with defaults for everything but the identity
    ///
    /// Mirrors what the client produces for a response that carries no
    /// fields at all.
    pub fn empty(job_id: impl Into<String>, captured_at: DateTime<Local>) -> Self {
        Self {
            captured_at,
            job_id: job_id.into(),
            status: JobStatus::Unknown,
            sub_status: 0,
            sub_msg: String::new(),
            running_time_ms: 0,
            created_at: String::new(),
            finished_at: None,
            timeline: None,
            node_count: 0,
            priority: 0,
        }
    }

    /// Whether this snapshot carries a terminal status
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Lifecycle phases reported in a job timeline, in their fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimelinePhase {
    Created,
    ResourcePrepared,
    Run,
    Finished,
}

impl TimelinePhase {
    pub const ALL: [TimelinePhase; 4] = [
        TimelinePhase::Created,
        TimelinePhase::ResourcePrepared,
        TimelinePhase::Run,
        TimelinePhase::Finished,
    ];

    /// Key used by the remote API
    pub fn key(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::ResourcePrepared => "resource_prepared",
            Self::Run => "run",
            Self::Finished => "finished",
        }
    }

    /// Short label for the console summary
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::ResourcePrepared => "Resource",
            Self::Run => "Started",
            Self::Finished => "Finished",
        }
    }

    /// Longer label used in notification messages
    pub fn long_label(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::ResourcePrepared => "Resource Ready",
            Self::Run => "Started",
            Self::Finished => "Finished",
        }
    }
}

/// Phase timestamps of a job, as raw millisecond-epoch text
///
/// Phases the job has not reached yet are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub created: Option<String>,
    pub resource_prepared: Option<String>,
    pub run: Option<String>,
    pub finished: Option<String>,
}

impl Timeline {
    /// Raw timestamp recorded for a phase, if it was reached
    pub fn get(&self, phase: TimelinePhase) -> Option<&str> {
        let value = match phase {
            TimelinePhase::Created => &self.created,
            TimelinePhase::ResourcePrepared => &self.resource_prepared,
            TimelinePhase::Run => &self.run,
            TimelinePhase::Finished => &self.finished,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Reached phases in their fixed order
    pub fn phases(&self) -> impl Iterator<Item = (TimelinePhase, &str)> + '_ {
        TimelinePhase::ALL
            .into_iter()
            .filter_map(|phase| self.get(phase).map(|raw| (phase, raw)))
    }

    pub fn is_empty(&self) -> bool {
        self.phases().next().is_none()
    }

    /// Checks that the numeric phase timestamps never go backwards
    ///
    /// Values that do not parse as integers are ignored.
    pub fn is_ordered(&self) -> bool {
        let stamps: Vec<i64> = self
            .phases()
            .filter_map(|(_, raw)| raw.trim().parse::<i64>().ok())
            .collect();
        stamps.windows(2).all(|pair| pair[0] <= pair[1])
    }
}
