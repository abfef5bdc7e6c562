//! Progress and status events
//!
//! Two independent broadcast channels. There is no history: a receiver only
//! sees what is sent after it subscribed.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::models::{DecisionRecord, RecordStatus};

/// Snapshot of one record's status after a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub student_id: String,
    pub status: RecordStatus,
    pub error_message: Option<String>,
}

impl StatusChange {
    pub fn of(record: &DecisionRecord) -> Self {
        Self {
            student_id: record.student_id.clone(),
            status: record.status(),
            error_message: record.error_message().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reporter {
    progress: broadcast::Sender<String>,
    status: broadcast::Sender<StatusChange>,
}

impl Reporter {
    pub fn new(capacity: usize) -> Self {
        let (progress, _) = broadcast::channel(capacity.max(1));
        let (status, _) = broadcast::channel(capacity.max(1));
        Self { progress, status }
    }

    /// Publishes a progress line and mirrors it to `tracing`
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        // No receivers is fine.
        let _ = self.progress.send(message);
    }

    /// Same as [`log`](Self::log) at warn level
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        let _ = self.progress.send(message);
    }

    pub fn status(&self, change: StatusChange) {
        debug!(
            "status {} -> {}{}",
            change.student_id,
            change.status,
            change
                .error_message
                .as_deref()
                .map(|m| format!(" ({})", m))
                .unwrap_or_default()
        );
        let _ = self.status.send(change);
    }

    pub fn subscribe_progress(&self) -> broadcast::Receiver<String> {
        self.progress.subscribe()
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<StatusChange> {
        self.status.subscribe()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let reporter = Reporter::new(16);
        let mut early = reporter.subscribe_progress();

        reporter.log("first");
        let mut late = reporter.subscribe_progress();
        reporter.log("second");

        assert_eq!(early.try_recv().unwrap(), "first");
        assert_eq!(early.try_recv().unwrap(), "second");
        assert_eq!(late.try_recv().unwrap(), "second");
        assert_eq!(late.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn every_subscriber_gets_status_changes() {
        let reporter = Reporter::new(16);
        let mut a = reporter.subscribe_status();
        let mut b = reporter.subscribe_status();

        let mut record = DecisionRecord::new("S1", "Reject", "Ada", "CS");
        record.advance(RecordStatus::Processing, None).unwrap();
        reporter.status(StatusChange::of(&record));

        let expected = StatusChange {
            student_id: "S1".to_string(),
            status: RecordStatus::Processing,
            error_message: None,
        };
        assert_eq!(a.try_recv().unwrap(), expected);
        assert_eq!(b.try_recv().unwrap(), expected);
    }

    #[test]
    fn sending_without_subscribers_is_harmless() {
        let reporter = Reporter::new(0);
        reporter.log("nobody listens");
        reporter.status(StatusChange {
            student_id: "S1".to_string(),
            status: RecordStatus::Skipped,
            error_message: None,
        });
    }
}
