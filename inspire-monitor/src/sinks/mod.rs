//! Reporting sinks
//!
//! Sinks consume the reportable moments of a session. The monitor loop
//! calls them synchronously and in a fixed order (console, file export,
//! notification); a failing sink is logged and never stops the session.

pub mod console;
pub mod export;
pub mod notify;

pub use console::ConsoleSink;
pub use export::ExportSink;
pub use notify::{GitHubNotifier, NotificationSink};

use async_trait::async_trait;
use inspire_core::domain::Snapshot;
use inspire_core::transition::Transition;
use std::time::Duration;

use crate::error::SinkError;
use crate::session::{SessionContext, Termination};

/// A snapshot that warrants a full report
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub session: &'a SessionContext,
    pub current: &'a Snapshot,
    pub previous: Option<&'a Snapshot>,
    pub transition: Transition,
    /// Every snapshot so far, oldest first, ending with `current`
    pub history: &'a [Snapshot],
    pub elapsed: Duration,
}

/// End-of-session record handed to every sink once
#[derive(Debug, Clone, Copy)]
pub struct SessionRecord<'a> {
    pub session: &'a SessionContext,
    pub history: &'a [Snapshot],
    pub termination: Termination,
    pub elapsed: Duration,
}

/// Consumer of reportable transitions
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Full report of a changed or terminal snapshot
    async fn report(&self, report: &Report<'_>) -> Result<(), SinkError>;

    /// Lightweight indication for a poll that changed nothing
    fn progress(&self, _snapshot: &Snapshot, _elapsed: Duration) {}

    /// Called once when the session terminates
    async fn finish(&self, _record: &SessionRecord<'_>) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Builds the sink list in its fixed order
pub fn build_sinks(
    console: Option<ConsoleSink>,
    export: Option<ExportSink>,
    notification: Option<NotificationSink>,
) -> Vec<Box<dyn ReportSink>> {
    let mut sinks: Vec<Box<dyn ReportSink>> = Vec::new();
    if let Some(console) = console {
        sinks.push(Box::new(console));
    }
    if let Some(export) = export {
        sinks.push(Box::new(export));
    }
    if let Some(notification) = notification {
        sinks.push(Box::new(notification));
    }
    sinks
}
