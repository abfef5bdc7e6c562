//! Decision flow - workflow layer
//!
//! The complete sequence for one record:
//! 1. search for the student and open the matching result row
//! 2. open the Actions tab
//! 3. fill in the offer or reject form and submit (or hold, in dry run)
//!
//! Holds no page; the orchestrator lends it one per call.

use tracing::debug;

use crate::config::Timeouts;
use crate::error::{AppError, AppResult};
use crate::infrastructure::PortalPage;
use crate::models::{Decision, DecisionRecord};
use crate::services::{DecisionForm, Reporter, StudentSearch, Submission};
use crate::workflow::RecordCtx;

pub struct DecisionFlow {
    search: StudentSearch,
    form: DecisionForm,
    reporter: Reporter,
}

impl DecisionFlow {
    pub fn new(reporter: Reporter, timeouts: Timeouts, dry_run: bool) -> Self {
        Self {
            search: StudentSearch::new(reporter.clone(), timeouts),
            form: DecisionForm::new(reporter.clone(), timeouts, dry_run),
            reporter,
        }
    }

    pub async fn run(
        &self,
        page: &dyn PortalPage,
        record: &DecisionRecord,
        ctx: &RecordCtx,
    ) -> AppResult<Submission> {
        let label = match ctx.decision {
            Decision::Accept => "OFFER",
            Decision::Reject => "REJECT",
            Decision::Other => {
                return Err(AppError::Other(format!(
                    "Unsupported decision '{}'",
                    record.decision
                )))
            }
        };
        self.reporter.log(format!(
            "Processing {} for: {} (Prog: '{}')",
            label, record.student_id, record.programme_code
        ));
        debug!("{} starting decision flow", ctx);

        self.search.open_record(page, record).await?;
        self.form.open_actions_tab(page).await?;

        match ctx.decision {
            Decision::Accept => self.form.recommend_offer(page).await,
            _ => self.form.recommend_reject(page).await,
        }
    }
}
