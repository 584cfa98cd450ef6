//! Monitoring session context and outcome

use chrono::{DateTime, Local};
use inspire_core::domain::{JobStatus, Snapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::config::SessionConfig;

/// Identity and settings of one monitoring run
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub config: SessionConfig,
    pub started_at: DateTime<Local>,
}

impl SessionContext {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            config,
            started_at: Local::now(),
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum Termination {
    /// The job reached a terminal status
    Completed { status: JobStatus },
    /// The overall timeout elapsed
    Timeout,
    /// An operator interrupt was received
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed { status } => write!(f, "completed ({})", status),
            Self::Timeout => f.write_str("timeout"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Result of a finished session
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub termination: Termination,
    pub history: Vec<Snapshot>,
    pub polls: u32,
    pub elapsed: Duration,
}

impl SessionOutcome {
    /// Status of the last observed snapshot, if any
    pub fn final_status(&self) -> Option<JobStatus> {
        self.history.last().map(|s| s.status)
    }
}
