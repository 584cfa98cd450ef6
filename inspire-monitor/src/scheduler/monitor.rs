//! Monitor loop
//!
//! Polls the status repository for one job until the job reaches a terminal
//! status, the overall timeout elapses, or cancellation is requested.
//!
//! Each cycle:
//! 1. stop if cancelled, or if the elapsed time exceeds the timeout
//! 2. fetch a snapshot; a failed fetch is logged and the cycle skipped
//! 3. append it to the history and compare it with the previous one
//! 4. fan a full report out to the sinks when it changed (or is terminal),
//!    otherwise emit a progress indication
//! 5. stop on a terminal status, else wait one interval (interruptible)
//!
//! On termination every sink gets one `finish` call with the full history.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, info_span, warn};

use inspire_core::domain::{JobStatus, Snapshot};
use inspire_core::transition::Transition;

use crate::config::SessionConfig;
use crate::error::MonitorError;
use crate::repository::StatusRepository;
use crate::scheduler::{History, ShutdownToken};
use crate::session::{SessionContext, SessionOutcome, Termination};
use crate::sinks::{Report, ReportSink, SessionRecord};

/// Drives one monitoring session
pub struct MonitorLoop {
    session: SessionContext,
    repository: Arc<dyn StatusRepository>,
    sinks: Vec<Box<dyn ReportSink>>,
    shutdown: ShutdownToken,
}

impl MonitorLoop {
    /// Creates a monitor loop for a validated session
    ///
    /// # Arguments
    /// * `config` - Session parameters, rejected if out of range
    /// * `repository` - Where snapshots come from
    /// * `sinks` - Reporting sinks, invoked in the given order
    /// * `shutdown` - Cancellation token observed between polls
    pub fn new(
        config: SessionConfig,
        repository: Arc<dyn StatusRepository>,
        sinks: Vec<Box<dyn ReportSink>>,
        shutdown: ShutdownToken,
    ) -> Result<Self, MonitorError> {
        config.validate()?;

        Ok(Self {
            session: SessionContext::new(config),
            repository,
            sinks,
            shutdown,
        })
    }

    /// Session identity, mostly useful for logs
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Runs the session to completion
    pub async fn run(mut self) -> SessionOutcome {
        let span = info_span!(
            "session",
            job_id = %self.session.config.job_id,
            session_id = %self.session.session_id
        );
        self.session.started_at = chrono::Local::now();
        self.run_session().instrument(span).await
    }

    async fn run_session(self) -> SessionOutcome {
        let config = &self.session.config;
        info!("Starting to monitor job: {}", config.job_id);
        info!(
            "Poll interval: {:?}, Timeout: {:?}",
            config.poll_interval, config.timeout
        );

        let started = Instant::now();
        let mut history = History::new();
        let mut polls: u32 = 0;

        let termination = loop {
            if self.shutdown.is_cancelled() {
                info!("Cancellation requested, stopping");
                break Termination::Cancelled;
            }

            let elapsed = started.elapsed();
            if elapsed > config.timeout {
                warn!("Monitoring timeout after {:?}", config.timeout);
                break Termination::Timeout;
            }

            polls += 1;
            debug!("Poll #{} at {:?}", polls, elapsed);

            match self.repository.fetch(&config.job_id).await {
                Ok(snapshot) => {
                    if let Some(status) = self
                        .handle_snapshot(&mut history, snapshot, started.elapsed())
                        .await
                    {
                        info!("Job reached terminal status: {}", status);
                        break Termination::Completed { status };
                    }
                }
                Err(e) => {
                    error!("Failed to get job status, continuing: {}", e);
                }
            }

            if !self.wait_for_next_poll().await {
                info!("Cancellation requested during wait, stopping");
                break Termination::Cancelled;
            }
        };

        let elapsed = started.elapsed();
        self.finish(&history, termination, elapsed).await;
        info!(
            "Monitoring completed: {} ({} snapshots)",
            termination,
            history.len()
        );

        SessionOutcome {
            termination,
            history: history.into_vec(),
            polls,
            elapsed,
        }
    }

    /// Records a snapshot and reports it
    ///
    /// Returns the status when it is terminal.
    async fn handle_snapshot(
        &self,
        history: &mut History,
        snapshot: Snapshot,
        elapsed: Duration,
    ) -> Option<JobStatus> {
        history.push(snapshot);
        let (current, previous) = history.latest_pair()?;
        let transition = Transition::detect(previous, current);

        if transition.needs_report() {
            if transition.changed {
                info!(
                    "Status changed: {} (sub_status: {})",
                    current.status, current.sub_status
                );
            }
            let report = Report {
                session: &self.session,
                current,
                previous,
                transition,
                history: history.as_slice(),
                elapsed,
            };
            self.dispatch(&report).await;
        } else {
            for sink in &self.sinks {
                sink.progress(current, elapsed);
            }
        }

        transition.terminal.then_some(current.status)
    }

    /// Hands a report to every sink in order
    async fn dispatch(&self, report: &Report<'_>) {
        for sink in &self.sinks {
            if let Err(e) = sink.report(report).await {
                warn!("{} sink failed: {}", sink.name(), e);
            }
        }
    }

    async fn finish(&self, history: &History, termination: Termination, elapsed: Duration) {
        let record = SessionRecord {
            session: &self.session,
            history: history.as_slice(),
            termination,
            elapsed,
        };
        for sink in &self.sinks {
            if let Err(e) = sink.finish(&record).await {
                warn!("{} sink failed to finish: {}", sink.name(), e);
            }
        }
    }

    /// Sleeps one poll interval; returns false if cancelled meanwhile
    async fn wait_for_next_poll(&self) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.session.config.poll_interval) => true,
            _ = self.shutdown.cancelled() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::scheduler::shutdown::shutdown_channel;
    use crate::sinks::ExportSink;
    use async_trait::async_trait;
    use chrono::Local;
    use inspire_client::ClientError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Observe(JobStatus, i64),
        Protocol,
        Exhausted,
    }

    /// Repository that replays a script, then repeats a fallback step
    struct ScriptedRepository {
        steps: Mutex<VecDeque<Step>>,
        fallback: Step,
        origin: Instant,
        poll_times: Mutex<Vec<Duration>>,
    }

    impl ScriptedRepository {
        fn new(steps: Vec<Step>, fallback: Step) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                fallback,
                origin: Instant::now(),
                poll_times: Mutex::new(Vec::new()),
            })
        }

        fn poll_times(&self) -> Vec<u64> {
            self.poll_times
                .lock()
                .unwrap()
                .iter()
                .map(|d| d.as_secs())
                .collect()
        }
    }

    #[async_trait]
    impl StatusRepository for ScriptedRepository {
        async fn fetch(&self, job_id: &str) -> Result<Snapshot, ClientError> {
            self.poll_times.lock().unwrap().push(self.origin.elapsed());
            let step = self
                .steps
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(self.fallback);

            match step {
                Step::Observe(status, sub_status) => Ok(Snapshot {
                    status,
                    sub_status,
                    ..Snapshot::empty(job_id, Local::now())
                }),
                Step::Protocol => Err(ClientError::protocol("truncated body")),
                Step::Exhausted => Err(ClientError::TransientFailure {
                    attempts: 3,
                    message: "connection refused".to_string(),
                }),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Report {
            sink: &'static str,
            status: JobStatus,
            sub_status: i64,
            first: bool,
            history_len: usize,
        },
        Progress(JobStatus),
        Finish {
            sink: &'static str,
            termination: Termination,
            history_len: usize,
        },
    }

    #[derive(Clone)]
    struct RecordingSink {
        name: &'static str,
        events: Arc<Mutex<Vec<Event>>>,
        fail: bool,
    }

    impl RecordingSink {
        fn new(name: &'static str, events: &Arc<Mutex<Vec<Event>>>) -> Self {
            Self {
                name,
                events: Arc::clone(events),
                fail: false,
            }
        }

        fn failing(name: &'static str, events: &Arc<Mutex<Vec<Event>>>) -> Self {
            Self {
                fail: true,
                ..Self::new(name, events)
            }
        }
    }

    #[async_trait]
    impl ReportSink for RecordingSink {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn report(&self, report: &Report<'_>) -> Result<(), SinkError> {
            self.events.lock().unwrap().push(Event::Report {
                sink: self.name,
                status: report.current.status,
                sub_status: report.current.sub_status,
                first: report.previous.is_none(),
                history_len: report.history.len(),
            });
            if self.fail {
                return Err(SinkError::NotificationRejected {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(())
        }

        fn progress(&self, snapshot: &Snapshot, _elapsed: Duration) {
            self.events
                .lock()
                .unwrap()
                .push(Event::Progress(snapshot.status));
        }

        async fn finish(&self, record: &SessionRecord<'_>) -> Result<(), SinkError> {
            self.events.lock().unwrap().push(Event::Finish {
                sink: self.name,
                termination: record.termination,
                history_len: record.history.len(),
            });
            Ok(())
        }
    }

    fn config(interval: u64, timeout: u64) -> SessionConfig {
        SessionConfig::new("job-77")
            .with_poll_interval(Duration::from_secs(interval))
            .with_timeout(Duration::from_secs(timeout))
    }

    fn monitor(
        config: SessionConfig,
        repository: Arc<ScriptedRepository>,
        sinks: Vec<Box<dyn ReportSink>>,
        shutdown: ShutdownToken,
    ) -> MonitorLoop {
        MonitorLoop::new(config, repository, sinks, shutdown).unwrap()
    }

    fn reports(events: &[Event]) -> Vec<(JobStatus, i64)> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Report {
                    status, sub_status, ..
                } => Some((*status, *sub_status)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_invalid_session_is_rejected() {
        let (_sender, token) = shutdown_channel();
        let repository = ScriptedRepository::new(vec![], Step::Observe(JobStatus::Running, 0));

        let result = MonitorLoop::new(config(10, 5), repository, vec![], token);
        assert!(matches!(result, Err(MonitorError::Configuration(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_changes_and_stops_on_terminal() {
        let (_sender, token) = shutdown_channel();
        let events = Arc::new(Mutex::new(Vec::new()));
        let repository = ScriptedRepository::new(
            vec![
                Step::Observe(JobStatus::Pending, 0),
                Step::Observe(JobStatus::Pending, 0),
                Step::Observe(JobStatus::Running, 0),
                Step::Observe(JobStatus::Running, 1),
                Step::Observe(JobStatus::Succeeded, 1),
            ],
            Step::Observe(JobStatus::Running, 1),
        );

        let outcome = monitor(
            config(10, 3600),
            Arc::clone(&repository),
            vec![Box::new(RecordingSink::new("rec", &events))],
            token,
        )
        .run()
        .await;

        assert_eq!(
            outcome.termination,
            Termination::Completed {
                status: JobStatus::Succeeded
            }
        );
        assert_eq!(outcome.polls, 5);
        assert_eq!(repository.poll_times(), vec![0, 10, 20, 30, 40]);
        assert_eq!(outcome.history.len(), 5);
        assert_eq!(outcome.final_status(), Some(JobStatus::Succeeded));
        assert_eq!(
            outcome.history.iter().filter(|s| s.is_terminal()).count(),
            1
        );

        let events = events.lock().unwrap();
        assert_eq!(
            reports(&events),
            vec![
                (JobStatus::Pending, 0),
                (JobStatus::Running, 0),
                (JobStatus::Running, 1),
                (JobStatus::Succeeded, 1),
            ]
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Event::Progress(_)))
                .count(),
            1
        );
        assert!(matches!(
            events.first(),
            Some(Event::Report {
                first: true,
                history_len: 1,
                ..
            })
        ));
        assert_eq!(
            events.last(),
            Some(&Event::Finish {
                sink: "rec",
                termination: Termination::Completed {
                    status: JobStatus::Succeeded
                },
                history_len: 5,
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_number_of_polls() {
        let (_sender, token) = shutdown_channel();
        let repository = ScriptedRepository::new(vec![], Step::Observe(JobStatus::Running, 0));

        let outcome = monitor(config(10, 25), Arc::clone(&repository), vec![], token)
            .run()
            .await;

        assert_eq!(outcome.termination, Termination::Timeout);
        assert_eq!(outcome.polls, 3);
        assert_eq!(repository.poll_times(), vec![0, 10, 20]);
        assert_eq!(outcome.elapsed, Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failures_skip_cycle_without_aborting() {
        let (_sender, token) = shutdown_channel();
        let events = Arc::new(Mutex::new(Vec::new()));
        let repository = ScriptedRepository::new(
            vec![
                Step::Observe(JobStatus::Running, 0),
                Step::Protocol,
                Step::Observe(JobStatus::Running, 0),
                Step::Exhausted,
                Step::Observe(JobStatus::Failed, 0),
            ],
            Step::Observe(JobStatus::Running, 0),
        );

        let outcome = monitor(
            config(10, 3600),
            Arc::clone(&repository),
            vec![Box::new(RecordingSink::new("rec", &events))],
            token,
        )
        .run()
        .await;

        assert_eq!(repository.poll_times(), vec![0, 10, 20, 30, 40]);
        assert_eq!(outcome.polls, 5);
        assert_eq!(outcome.history.len(), 3);
        assert_eq!(
            outcome.termination,
            Termination::Completed {
                status: JobStatus::Failed
            }
        );

        // The snapshot after the failure is compared with the last good one
        let events = events.lock().unwrap();
        assert_eq!(
            reports(&events),
            vec![(JobStatus::Running, 0), (JobStatus::Failed, 0)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_is_chronological() {
        let (_sender, token) = shutdown_channel();
        let repository = ScriptedRepository::new(
            vec![
                Step::Observe(JobStatus::Pending, 0),
                Step::Observe(JobStatus::Running, 0),
                Step::Observe(JobStatus::Running, 0),
                Step::Observe(JobStatus::Cancelled, 0),
            ],
            Step::Observe(JobStatus::Running, 0),
        );

        let outcome = monitor(config(1, 60), repository, vec![], token).run().await;

        assert!(
            outcome
                .history
                .windows(2)
                .all(|pair| pair[0].captured_at <= pair[1].captured_at)
        );
        assert!(outcome.history.last().unwrap().is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_wait_interrupts_within_interval() {
        let (sender, token) = shutdown_channel();
        let events = Arc::new(Mutex::new(Vec::new()));
        let repository = ScriptedRepository::new(vec![], Step::Observe(JobStatus::Running, 0));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(15)).await;
            sender.cancel();
        });

        let outcome = monitor(
            config(10, 3600),
            Arc::clone(&repository),
            vec![Box::new(RecordingSink::new("rec", &events))],
            token,
        )
        .run()
        .await;

        assert_eq!(outcome.termination, Termination::Cancelled);
        assert_eq!(repository.poll_times(), vec![0, 10]);
        assert_eq!(outcome.elapsed, Duration::from_secs(15));

        let events = events.lock().unwrap();
        assert_eq!(
            events.last(),
            Some(&Event::Finish {
                sink: "rec",
                termination: Termination::Cancelled,
                history_len: 2,
            })
        );
    }

    #[tokio::test]
    async fn test_cancellation_still_exports() {
        let (sender, token) = shutdown_channel();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let repository = ScriptedRepository::new(vec![], Step::Observe(JobStatus::Running, 0));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            sender.cancel();
        });

        let outcome = monitor(
            config(1, 3600).with_export_path(&path),
            Arc::clone(&repository),
            vec![Box::new(ExportSink::new(&path))],
            token,
        )
        .run()
        .await;

        assert_eq!(outcome.termination, Termination::Cancelled);
        assert_eq!(outcome.polls, 1);
        assert!(outcome.elapsed < Duration::from_secs(1));

        let document = ExportSink::read(&path).await.unwrap();
        assert_eq!(document.summary.total_snapshots, outcome.history.len());
        assert_eq!(document.summary.final_status, Some(JobStatus::Running));
        assert_eq!(document.summary.termination, Some(Termination::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_does_not_poll() {
        let (sender, token) = shutdown_channel();
        sender.cancel();
        let events = Arc::new(Mutex::new(Vec::new()));
        let repository = ScriptedRepository::new(vec![], Step::Observe(JobStatus::Running, 0));

        let outcome = monitor(
            config(10, 60),
            Arc::clone(&repository),
            vec![Box::new(RecordingSink::new("rec", &events))],
            token,
        )
        .run()
        .await;

        assert_eq!(outcome.termination, Termination::Cancelled);
        assert_eq!(outcome.polls, 0);
        assert!(repository.poll_times().is_empty());
        assert_eq!(
            *events.lock().unwrap(),
            vec![Event::Finish {
                sink: "rec",
                termination: Termination::Cancelled,
                history_len: 0,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sinks_run_in_order_and_failures_are_absorbed() {
        let (_sender, token) = shutdown_channel();
        let events = Arc::new(Mutex::new(Vec::new()));
        let repository = ScriptedRepository::new(
            vec![
                Step::Observe(JobStatus::Running, 0),
                Step::Observe(JobStatus::Succeeded, 0),
            ],
            Step::Observe(JobStatus::Running, 0),
        );

        let outcome = monitor(
            config(10, 60),
            repository,
            vec![
                Box::new(RecordingSink::failing("console", &events)),
                Box::new(RecordingSink::new("export", &events)),
                Box::new(RecordingSink::failing("notification", &events)),
            ],
            token,
        )
        .run()
        .await;

        assert!(matches!(outcome.termination, Termination::Completed { .. }));

        let order: Vec<&str> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Report { sink, .. } => Some(*sink),
                _ => None,
            })
            .collect();
        assert_eq!(
            order,
            vec![
                "console",
                "export",
                "notification",
                "console",
                "export",
                "notification"
            ]
        );
    }
}
