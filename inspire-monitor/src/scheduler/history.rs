//! Snapshot history of a session

use inspire_core::domain::Snapshot;
use tracing::warn;

/// Append-only, chronologically ordered list of snapshots
#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot
    ///
    /// A capture time earlier than the latest one (wall clock stepped back)
    /// is clamped so the history stays non-decreasing. A completion time,
    /// once recorded, is carried over unchanged to later snapshots.
    pub fn push(&mut self, mut snapshot: Snapshot) {
        if let Some(last) = self.snapshots.last() {
            if snapshot.captured_at < last.captured_at {
                warn!(
                    "Wall clock moved backwards ({} < {}), clamping capture time",
                    snapshot.captured_at, last.captured_at
                );
                snapshot.captured_at = last.captured_at;
            }

            if let Some(finished) = &last.finished_at {
                if snapshot.finished_at.as_ref() != Some(finished) {
                    warn!(
                        "Job {} completion time changed from {} to {:?}, keeping the first",
                        snapshot.job_id, finished, snapshot.finished_at
                    );
                    snapshot.finished_at = Some(finished.clone());
                }
            }
        }

        if let Some(timeline) = &snapshot.timeline {
            if !timeline.is_ordered() {
                warn!("Job {} reported out-of-order timeline phases", snapshot.job_id);
            }
        }

        self.snapshots.push(snapshot);
    }

    /// Most recent snapshot and the one before it
    pub fn latest_pair(&self) -> Option<(&Snapshot, Option<&Snapshot>)> {
        self.snapshots
            .split_last()
            .map(|(current, earlier)| (current, earlier.last()))
    }

    pub fn as_slice(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn into_vec(self) -> Vec<Snapshot> {
        self.snapshots
    }
}
