pub mod decision_form;
pub mod failure_writer;
pub mod navigator;
pub mod reason_matcher;
pub mod reporter;
pub mod run_log;
pub mod selectors;
pub mod student_search;

pub use decision_form::{DecisionForm, Submission};
pub use failure_writer::FailureWriter;
pub use navigator::Navigator;
pub use reason_matcher::{require_reason, select_reason, ReasonChoice, ReasonTier};
pub use reporter::{Reporter, StatusChange};
pub use run_log::{RunLog, RunLogTask};
pub use student_search::{scan_rows, MatchedRow, RowCheck, StudentSearch};
