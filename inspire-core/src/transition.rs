//! Transition detection between consecutive snapshots
//!
//! Only the primary status and the sub-status code take part in the
//! comparison. Running-time counters and message text drift on every poll
//! and must not cause a report.

use crate::domain::{JobStatus, Snapshot};

/// Whether a status ends the job's lifecycle
pub fn is_terminal(status: JobStatus) -> bool {
    status.is_terminal()
}

/// Whether `current` differs from `previous` in a reportable way
///
/// The first observation (no previous snapshot) always counts as a change.
pub fn has_changed(previous: Option<&Snapshot>, current: &Snapshot) -> bool {
    match previous {
        None => true,
        Some(prev) => prev.status != current.status || prev.sub_status != current.sub_status,
    }
}

/// Judgment about one newly observed snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub changed: bool,
    pub terminal: bool,
}

impl Transition {
    pub fn detect(previous: Option<&Snapshot>, current: &Snapshot) -> Self {
        Self {
            changed: has_changed(previous, current),
            terminal: is_terminal(current.status),
        }
    }

    /// Whether the snapshot gets a full report
    ///
    /// A terminal snapshot is always reported, even when its sub-status
    /// repeats the previous poll.
    pub fn needs_report(&self) -> bool {
        self.changed || self.terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn snapshot(status: JobStatus, sub_status: i64) -> Snapshot {
        Snapshot {
            status,
            sub_status,
            ..Snapshot::empty("job-1", Local::now())
        }
    }

    #[test]
    fn test_first_observation_is_a_change() {
        let current = snapshot(JobStatus::Pending, 0);
        assert!(has_changed(None, &current));
        assert!(Transition::detect(None, &current).needs_report());
    }

    #[test]
    fn test_cosmetic_drift_is_not_a_change() {
        let prev = snapshot(JobStatus::Running, 3);
        let mut curr = snapshot(JobStatus::Running, 3);
        curr.running_time_ms = 120_000;
        curr.sub_msg = "still going".to_string();
        curr.node_count = 8;

        assert!(!has_changed(Some(&prev), &curr));
        assert!(!Transition::detect(Some(&prev), &curr).needs_report());
    }

    #[test]
    fn test_status_or_sub_status_change_is_detected() {
        let prev = snapshot(JobStatus::Pending, 1);
        assert!(has_changed(Some(&prev), &snapshot(JobStatus::Running, 1)));
        assert!(has_changed(Some(&prev), &snapshot(JobStatus::Pending, 2)));
    }

    #[test]
    fn test_terminal_snapshot_reported_without_change() {
        let prev = snapshot(JobStatus::Succeeded, 0);
        let curr = snapshot(JobStatus::Succeeded, 0);
        let transition = Transition::detect(Some(&prev), &curr);

        assert!(!transition.changed);
        assert!(transition.terminal);
        assert!(transition.needs_report());
    }

    #[test]
    fn test_is_terminal() {
        assert!(is_terminal(JobStatus::Failed));
        assert!(!is_terminal(JobStatus::Unknown));
    }
}
