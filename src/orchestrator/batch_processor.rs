//! Batch processor - orchestration layer
//!
//! Entry point of the engine. Owns the session for the whole run:
//!
//! 1. **initialize**: start the run log, launch or attach the browser
//! 2. **run**: log in, go to the search page, hand the records to the
//!    record processor
//! 3. **shutdown**: close the session (safe to call more than once)

use tracing::{info, warn};

use crate::browser::SessionManager;
use crate::config::Config;
use crate::error::{AppResult, SessionError};
use crate::models::{DecisionFilter, DecisionRecord};
use crate::orchestrator::{BatchSummary, CancelHandle, RecordProcessor};
use crate::services::{FailureWriter, Navigator, Reporter, RunLog, RunLogTask};
use crate::utils::logging::{log_records_loaded, log_startup, print_final_stats};

pub struct App {
    config: Config,
    session: SessionManager,
    reporter: Reporter,
    cancel: CancelHandle,
    run_log: Option<RunLogTask>,
}

impl App {
    /// Starts the run log and opens the browser session
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let reporter = Reporter::new(config.event_capacity);
        let run_log = RunLog::create(&config.output_log_file)
            .await?
            .attach(&reporter);

        log_startup(&config);

        let mut session = SessionManager::new(config.clone(), reporter.clone());
        reporter.log("Initialising browser automation...");
        session.initialize().await?;

        Ok(Self {
            config,
            session,
            reporter,
            cancel: CancelHandle::new(),
            run_log: Some(run_log),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_session(config: Config, session: SessionManager, reporter: Reporter) -> Self {
        Self {
            config,
            session,
            reporter,
            cancel: CancelHandle::new(),
            run_log: None,
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Logs in, then processes `records` in order.
    ///
    /// A login that never completes aborts with `SessionError::LoginTimedOut`.
    pub async fn run(
        &self,
        records: Vec<DecisionRecord>,
        filter: DecisionFilter,
    ) -> AppResult<BatchSummary> {
        log_records_loaded(&records, filter);

        self.reporter.log("Attempting login to Portico...");
        if !self.session.login().await? {
            self.reporter.warn("Login failed or timed out.");
            return Err(SessionError::LoginTimedOut {
                waited: self.config.timeouts().login,
            }
            .into());
        }

        let page = self.session.page()?;
        Navigator::new(self.reporter.clone())
            .to_search_entry(page.as_ref())
            .await?;

        let processor = RecordProcessor::new(
            self.reporter.clone(),
            self.config.timeouts(),
            filter,
            self.config.dry_run,
        );
        let summary = processor
            .process_records(page.as_ref(), records, &self.cancel)
            .await?;

        self.write_failures(&summary);
        print_final_stats(&summary, &self.config.output_log_file);
        Ok(summary)
    }

    /// Closes the browser session and flushes the run log; later calls do nothing
    pub async fn shutdown(&mut self) {
        self.session.close().await;
        if let Some(run_log) = self.run_log.take() {
            run_log.finish().await;
        }
        info!("session closed");
    }

    fn write_failures(&self, summary: &BatchSummary) {
        let writer = FailureWriter::with_path(&self.config.warn_file);
        match writer.write_failures(&summary.records) {
            Ok(0) => {}
            Ok(n) => warn!("⚠️ {} failed records written to {}", n, self.config.warn_file),
            Err(e) => warn!("cannot write {}: {}", self.config.warn_file, e),
        }
    }
}
