//! Console summary sink

use async_trait::async_trait;
use colored::*;
use inspire_core::domain::{JobStatus, Snapshot};
use inspire_core::format::{UNKNOWN, format_duration_ms, format_elapsed, format_timestamp};
use std::io::Write;
use std::time::Duration;

use super::{Report, ReportSink, SessionRecord};
use crate::error::SinkError;

/// One labelled line of the summary block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub label: &'static str,
    pub value: String,
    /// Timeline entries are indented under a heading
    pub nested: bool,
}

impl SummaryLine {
    fn field(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            nested: false,
        }
    }

    fn phase(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            nested: true,
        }
    }

    /// Plain-text rendering with labels padded to a fixed column
    pub fn render(&self) -> String {
        let label = format!("{}:", self.label);
        if self.nested {
            format!("  {:<13}{}", label, self.value)
        } else {
            format!("{:<15}{}", label, self.value)
        }
    }
}

/// Lines of the fixed-format summary block for a snapshot
pub fn summary_lines(snapshot: &Snapshot) -> Vec<SummaryLine> {
    let mut lines = vec![
        SummaryLine::field("Job ID", snapshot.job_id.clone()),
        SummaryLine::field("Status", snapshot.status.as_str()),
        SummaryLine::field("Sub Status", snapshot.sub_status.to_string()),
        SummaryLine::field("Sub Message", snapshot.sub_msg.clone()),
        SummaryLine::field("Running Time", format_duration_ms(snapshot.running_time_ms)),
        SummaryLine::field("Created At", format_timestamp(&snapshot.created_at)),
    ];

    if let Some(finished) = &snapshot.finished_at {
        lines.push(SummaryLine::field("Finished At", format_timestamp(finished)));
    }

    lines.push(SummaryLine::field("Node Count", snapshot.node_count.to_string()));
    lines.push(SummaryLine::field("Priority", snapshot.priority.to_string()));

    if let Some(timeline) = &snapshot.timeline {
        for (phase, raw) in timeline.phases() {
            lines.push(SummaryLine::phase(phase.label(), format_timestamp(raw)));
        }
    }

    lines
}

/// Single-line progress text for an unchanged poll
pub fn progress_line(snapshot: &Snapshot, elapsed: Duration) -> String {
    format!(
        "[{}] Status: {} | Running: {}",
        format_elapsed(elapsed),
        snapshot.status,
        format_duration_ms(snapshot.running_time_ms)
    )
}

/// The one line printed when a session ends
pub fn closing_line(record: &SessionRecord<'_>) -> String {
    let last = record
        .history
        .last()
        .map(|s| s.status.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());
    format!(
        "Monitoring finished: {} after {} snapshot(s) in {} (last status: {})",
        record.termination,
        record.history.len(),
        format_elapsed(record.elapsed),
        last
    )
}

/// Prints summaries and progress to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    /// Print the summary block of a snapshot
    pub fn print_summary(snapshot: &Snapshot) {
        let rule = "=".repeat(60);
        println!();
        println!("{}", rule.dimmed());
        println!(
            "{}",
            format!(
                "Job Status Summary - {}",
                snapshot.captured_at.format("%Y-%m-%d %H:%M:%S")
            )
            .bold()
        );
        println!("{}", rule.dimmed());

        let lines = summary_lines(snapshot);
        let mut timeline_started = false;
        for line in &lines {
            if line.nested && !timeline_started {
                println!("\n{}", "Timeline:".bold());
                timeline_started = true;
            }
            if line.label == "Status" && !line.nested {
                println!(
                    "{:<15}{}",
                    "Status:",
                    colorize_status(&snapshot.status)
                );
            } else {
                println!("{}", line.render());
            }
        }
    }
}

#[async_trait]
impl ReportSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn report(&self, report: &Report<'_>) -> Result<(), SinkError> {
        Self::print_summary(report.current);
        Ok(())
    }

    fn progress(&self, snapshot: &Snapshot, elapsed: Duration) {
        print!("\r{}", progress_line(snapshot, elapsed));
        let _ = std::io::stdout().flush();
    }

    async fn finish(&self, record: &SessionRecord<'_>) -> Result<(), SinkError> {
        println!();
        println!("{}", closing_line(record).bold());
        Ok(())
    }
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    let status_str = status.as_str();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Succeeded => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Cancelled => status_str.dimmed(),
        JobStatus::Unknown => status_str.magenta(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::session::{SessionContext, Termination};
    use chrono::Local;
    use inspire_core::domain::Timeline;

    fn rendered(snapshot: &Snapshot) -> Vec<String> {
        summary_lines(snapshot).iter().map(SummaryLine::render).collect()
    }

    #[test]
    fn test_summary_block_without_optional_parts() {
        let snapshot = Snapshot {
            status: JobStatus::Running,
            sub_status: 2,
            sub_msg: "pulling image".to_string(),
            running_time_ms: 61_000,
            created_at: "not-a-number".to_string(),
            node_count: 4,
            priority: 10,
            ..Snapshot::empty("job-9", Local::now())
        };

        assert_eq!(
            rendered(&snapshot),
            vec![
                "Job ID:        job-9",
                "Status:        RUNNING",
                "Sub Status:    2",
                "Sub Message:   pulling image",
                "Running Time:  1m 1s",
                "Created At:    Unknown",
                "Node Count:    4",
                "Priority:      10",
            ]
        );
    }

    #[test]
    fn test_summary_includes_finish_and_timeline_in_order() {
        let snapshot = Snapshot {
            status: JobStatus::Succeeded,
            finished_at: Some("bogus".to_string()),
            timeline: Some(Timeline {
                created: Some("x".to_string()),
                resource_prepared: None,
                run: Some("y".to_string()),
                finished: Some("z".to_string()),
            }),
            ..Snapshot::empty("job-9", Local::now())
        };

        let lines = rendered(&snapshot);
        assert!(lines.contains(&"Finished At:   Unknown".to_string()));

        let timeline: Vec<_> = lines.iter().filter(|l| l.starts_with("  ")).cloned().collect();
        assert_eq!(
            timeline,
            vec![
                "  Created:     Unknown",
                "  Started:     Unknown",
                "  Finished:    Unknown",
            ]
        );
    }

    #[test]
    fn test_progress_line() {
        let snapshot = Snapshot {
            status: JobStatus::Running,
            running_time_ms: 3_661_000,
            ..Snapshot::empty("job-9", Local::now())
        };
        assert_eq!(
            progress_line(&snapshot, Duration::from_secs(70)),
            "[0:01:10] Status: RUNNING | Running: 1h 1m 1s"
        );
    }

    #[test]
    fn test_closing_line_names_cause_and_last_status() {
        let session = SessionContext::new(SessionConfig::new("job-9"));
        let history = vec![
            Snapshot::empty("job-9", Local::now()),
            Snapshot {
                status: JobStatus::Failed,
                ..Snapshot::empty("job-9", Local::now())
            },
        ];
        let record = SessionRecord {
            session: &session,
            history: &history,
            termination: Termination::Completed {
                status: JobStatus::Failed,
            },
            elapsed: Duration::from_secs(3_725),
        };

        assert_eq!(
            closing_line(&record),
            "Monitoring finished: completed (FAILED) after 2 snapshot(s) in 1:02:05 (last status: FAILED)"
        );
    }

    #[test]
    fn test_closing_line_without_snapshots() {
        let session = SessionContext::new(SessionConfig::new("job-9"));
        let record = SessionRecord {
            session: &session,
            history: &[],
            termination: Termination::Cancelled,
            elapsed: Duration::from_secs(4),
        };

        assert_eq!(
            closing_line(&record),
            "Monitoring finished: cancelled after 0 snapshot(s) in 0:00:04 (last status: Unknown)"
        );
    }
}
