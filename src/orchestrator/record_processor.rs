//! Record processor - orchestration layer
//!
//! Walks the batch in order, one record at a time:
//!
//! 1. checks for cancellation at each record boundary
//! 2. marks ineligible records `Skipped` without touching the portal
//! 3. runs the decision flow with every fault (panics included) contained
//! 4. publishes `Processing` and the terminal status for each processed record
//! 5. returns to the search page before the next record

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

use crate::config::Timeouts;
use crate::error::AppResult;
use crate::infrastructure::PortalPage;
use crate::models::{DecisionFilter, DecisionRecord, RecordStatus};
use crate::orchestrator::CancelHandle;
use crate::services::{Navigator, Reporter, StatusChange, Submission};
use crate::workflow::{DecisionFlow, RecordCtx};

/// Final snapshot of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub records: Vec<DecisionRecord>,
    /// Stopped early by a cancel request
    pub cancelled: bool,
    /// Dry run stopped after the first processed record
    pub held_for_inspection: bool,
}

impl BatchSummary {
    pub fn count(&self, status: RecordStatus) -> usize {
        self.records.iter().filter(|r| r.status() == status).count()
    }

    pub fn success(&self) -> usize {
        self.count(RecordStatus::Success)
    }

    pub fn failed(&self) -> usize {
        self.count(RecordStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(RecordStatus::Skipped)
    }

    pub fn pending(&self) -> usize {
        self.count(RecordStatus::Pending)
    }
}

pub struct RecordProcessor {
    flow: DecisionFlow,
    navigator: Navigator,
    reporter: Reporter,
    filter: DecisionFilter,
    dry_run: bool,
}

impl RecordProcessor {
    pub fn new(reporter: Reporter, timeouts: Timeouts, filter: DecisionFilter, dry_run: bool) -> Self {
        Self {
            flow: DecisionFlow::new(reporter.clone(), timeouts, dry_run),
            navigator: Navigator::new(reporter.clone()),
            reporter,
            filter,
            dry_run,
        }
    }

    pub async fn process_records(
        &self,
        page: &dyn PortalPage,
        mut records: Vec<DecisionRecord>,
        cancel: &CancelHandle,
    ) -> AppResult<BatchSummary> {
        let total = records.len();
        let mut cancelled = false;
        let mut held_for_inspection = false;

        if self.dry_run {
            self.reporter
                .log("🐛 DRY RUN: processing only the first eligible record");
        }

        for (index, record) in records.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                self.reporter.warn("Processing cancelled by user.");
                cancelled = true;
                break;
            }

            if record.status() != RecordStatus::Pending {
                self.reporter.log(format!(
                    "Not processing {}: already {}",
                    record.student_id,
                    record.status()
                ));
                continue;
            }

            if !self.filter.allows(record.decision_kind()) {
                mark(record, RecordStatus::Skipped, None);
                self.reporter.log(format!(
                    "Skipped {} (Decision: {})",
                    record.student_id, record.decision
                ));
                continue;
            }

            let ctx = RecordCtx::new(index + 1, total, record);
            log_record_start(&ctx);

            mark(record, RecordStatus::Processing, None);
            self.reporter.status(StatusChange::of(record));

            let outcome = AssertUnwindSafe(self.flow.run(page, record, &ctx))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(submission)) => {
                    mark(record, RecordStatus::Success, None);
                    let verb = match submission {
                        Submission::Submitted => "processed",
                        Submission::HeldForInspection => "filled in (not submitted)",
                    };
                    self.reporter
                        .log(format!("SUCCESS: {} {}", record.student_id, verb));
                }
                Ok(Err(e)) => {
                    mark(record, RecordStatus::Failed, Some(e.to_string()));
                    self.reporter
                        .warn(format!("FAILED {}: {}", record.student_id, e));
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!("{} panicked: {}", ctx, message);
                    mark(record, RecordStatus::Failed, Some(message.clone()));
                    self.reporter
                        .warn(format!("FAILED {}: {}", record.student_id, message));
                }
            }
            self.reporter.status(StatusChange::of(record));

            if self.dry_run {
                self.reporter.log(
                    "🐛 DRY RUN complete: browser left on the current form for inspection.",
                );
                held_for_inspection = true;
                break;
            }

            if let Err(e) = self.navigator.to_search_entry(page).await {
                warn!("{} could not return to search: {}", ctx, e);
            }
        }

        let summary = BatchSummary {
            records,
            cancelled,
            held_for_inspection,
        };
        info!(
            "batch done: {} success, {} failed, {} skipped, {} pending",
            summary.success(),
            summary.failed(),
            summary.skipped(),
            summary.pending()
        );
        if !cancelled && !self.dry_run {
            self.reporter.log("Processing complete.");
        }
        Ok(summary)
    }
}

/// Only ever called on transitions the loop has already made legal; an
/// illegal one is logged and leaves the record untouched.
fn mark(record: &mut DecisionRecord, next: RecordStatus, error_message: Option<String>) {
    if let Err(e) = record.advance(next, error_message) {
        error!("{}: {}", record.student_id, e);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic during record processing".to_string()
    }
}

fn log_record_start(ctx: &RecordCtx) {
    info!("\n{} {}", ctx, "─".repeat(30));
}
