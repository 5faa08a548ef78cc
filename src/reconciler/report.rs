//! # Sync Report
//!
//! Per-run log and outcome. Every run builds its own [`SyncRun`], so one
//! invocation never shows entries from another.

use crate::error::SyncError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Run-level state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    /// Loading client configuration
    Running,
    NamespacePass,
    ServiceAccountPass,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

/// One line of operator-facing output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub namespaces_created: usize,
    pub namespaces_found: usize,
    pub namespaces_removed: usize,
    pub service_accounts_created: usize,
    pub service_accounts_found: usize,
    pub service_accounts_removed: usize,
    pub service_accounts_skipped: usize,
}

/// Outcome of a sync run, returned to whoever triggered it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// `Completed` or `Failed`
    pub phase: SyncPhase,
    /// Phase that was active when a fatal error occurred
    pub failed_phase: Option<SyncPhase>,
    pub error: Option<SyncError>,
    pub entries: Vec<LogEntry>,
    pub stats: SyncStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.phase == SyncPhase::Completed
    }

    /// Log messages in the order they were produced
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.message.clone()).collect()
    }
}

/// Mutable state of a run in progress
#[derive(Debug)]
pub(crate) struct SyncRun {
    phase: SyncPhase,
    entries: Vec<LogEntry>,
    pub(crate) stats: SyncStats,
    started_at: DateTime<Utc>,
}

impl SyncRun {
    pub(crate) fn new() -> Self {
        Self {
            phase: SyncPhase::Idle,
            entries: Vec::new(),
            stats: SyncStats::default(),
            started_at: Utc::now(),
        }
    }

    pub(crate) fn enter(&mut self, phase: SyncPhase) {
        self.phase = phase;
    }

    pub(crate) fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub(crate) fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(phase = ?self.phase, "{}", message);
        self.entries.push(LogEntry {
            level: LogLevel::Info,
            message,
        });
    }

    /// Record a problem that does not stop the run
    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!(phase = ?self.phase, "{}", message);
        self.entries.push(LogEntry {
            level: LogLevel::Error,
            message,
        });
    }

    pub(crate) fn complete(mut self) -> SyncReport {
        self.enter(SyncPhase::Completed);
        self.info("Synchronization completed.");
        self.into_report(None, None)
    }

    /// Close the run with exactly one trailing entry for `err`
    pub(crate) fn fail(mut self, err: SyncError) -> SyncReport {
        let failed_phase = self.phase();
        error!(phase = ?failed_phase, kind = err.kind(), "Synchronization failed: {}", err);
        self.entries.push(LogEntry {
            level: LogLevel::Error,
            message: format!("Exception: {err}"),
        });
        self.phase = SyncPhase::Failed;
        self.into_report(Some(failed_phase), Some(err))
    }

    fn into_report(self, failed_phase: Option<SyncPhase>, error: Option<SyncError>) -> SyncReport {
        SyncReport {
            phase: self.phase,
            failed_phase,
            error,
            entries: self.entries,
            stats: self.stats,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[test]
    fn test_run_starts_idle_and_empty() {
        let run = SyncRun::new();
        assert_eq!(run.phase(), SyncPhase::Idle);
        assert!(run.entries.is_empty());
    }

    #[test]
    fn test_fail_appends_single_trailing_entry() {
        let mut run = SyncRun::new();
        run.enter(SyncPhase::NamespacePass);
        run.info("Checking namespaces ...");
        let report = run.fail(SyncError::ClusterUnavailable("Unauthorized".to_string()));

        assert_eq!(report.phase, SyncPhase::Failed);
        assert_eq!(report.failed_phase, Some(SyncPhase::NamespacePass));
        assert_eq!(report.lines(), vec!["Checking namespaces ...", "Exception: Unauthorized"]);
        assert_eq!(report.entries.last().map(|e| e.level), Some(LogLevel::Error));
        assert!(!report.is_success());
    }

    #[test]
    fn test_complete_marks_success() {
        let report = SyncRun::new().complete();
        assert!(report.is_success());
        assert!(report.failed_phase.is_none());
        assert!(report.finished_at >= report.started_at);
    }

    #[derive(Clone, Default)]
    struct LevelRecorder(Arc<Mutex<Vec<Level>>>);

    impl<S: Subscriber> Layer<S> for LevelRecorder {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[test]
    fn test_entries_are_traced_at_matching_level() {
        let recorder = LevelRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            let mut run = SyncRun::new();
            run.info("Checking service accounts ...");
            run.error("Skipping ghost:sa-1, namespace does not exist.");
        });

        assert_eq!(*recorder.0.lock().unwrap(), vec![Level::INFO, Level::ERROR]);
    }

    #[test]
    fn test_report_serializes_phase_and_levels() {
        let mut run = SyncRun::new();
        run.error("Skipping ghost:sa-1, namespace does not exist.");
        let json = serde_json::to_value(run.complete()).unwrap();
        assert_eq!(json["phase"], "completed");
        assert_eq!(json["entries"][0]["level"], "error");
    }
}
