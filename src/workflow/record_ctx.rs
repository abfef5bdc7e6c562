//! Record processing context
//!
//! "Which record of the batch am I working on", for log lines.

use std::fmt::Display;

use crate::models::{Decision, DecisionRecord};

#[derive(Debug, Clone)]
pub struct RecordCtx {
    /// 1-based position in the batch
    pub index: usize,
    pub total: usize,
    pub student_id: String,
    pub decision: Decision,
}

impl RecordCtx {
    pub fn new(index: usize, total: usize, record: &DecisionRecord) -> Self {
        Self {
            index,
            total,
            student_id: record.student_id.clone(),
            decision: record.decision_kind(),
        }
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{} {}]", self.index, self.total, self.student_id)
    }
}
