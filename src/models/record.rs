use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing state of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RecordStatus {
    #[default]
    Pending,
    Processing,
    Success,
    Failed,
    Skipped,
}

impl RecordStatus {
    /// `Pending → {Skipped | Processing → {Success | Failed}}`
    pub fn can_advance_to(self, next: RecordStatus) -> bool {
        matches!(
            (self, next),
            (RecordStatus::Pending, RecordStatus::Skipped)
                | (RecordStatus::Pending, RecordStatus::Processing)
                | (RecordStatus::Processing, RecordStatus::Success)
                | (RecordStatus::Processing, RecordStatus::Failed)
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            RecordStatus::Pending => "Pending",
            RecordStatus::Processing => "Processing",
            RecordStatus::Success => "Success",
            RecordStatus::Failed => "Failed",
            RecordStatus::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Rejected status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: RecordStatus,
    pub to: RecordStatus,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal status transition {} -> {}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

/// Decision kinds the engine acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Accept,
    Reject,
    /// Any other spreadsheet value; never processed
    Other,
}

impl Decision {
    /// Case-insensitive, whitespace-tolerant
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("accept") {
            Decision::Accept
        } else if value.eq_ignore_ascii_case("reject") {
            Decision::Reject
        } else {
            Decision::Other
        }
    }
}

/// Which decision types a run acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecisionFilter {
    pub accepts: bool,
    pub rejects: bool,
}

impl DecisionFilter {
    pub fn new(accepts: bool, rejects: bool) -> Self {
        Self { accepts, rejects }
    }

    pub fn all() -> Self {
        Self::new(true, true)
    }

    pub fn allows(&self, decision: Decision) -> bool {
        match decision {
            Decision::Accept => self.accepts,
            Decision::Reject => self.rejects,
            Decision::Other => false,
        }
    }
}

/// One applicant to process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub student_id: String,
    pub decision: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub programme_code: String,
    #[serde(skip)]
    status: RecordStatus,
    #[serde(skip)]
    error_message: Option<String>,
}

impl DecisionRecord {
    pub fn new(
        student_id: impl Into<String>,
        decision: impl Into<String>,
        display_name: impl Into<String>,
        programme_code: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            decision: decision.into(),
            display_name: display_name.into(),
            programme_code: programme_code.into(),
            status: RecordStatus::Pending,
            error_message: None,
        }
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn decision_kind(&self) -> Decision {
        Decision::parse(&self.decision)
    }

    /// Moves the record forward; `error_message` is kept only for `Failed`.
    pub(crate) fn advance(
        &mut self,
        next: RecordStatus,
        error_message: Option<String>,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_advance_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.error_message = if next == RecordStatus::Failed {
            error_message
        } else {
            None
        };
        Ok(())
    }
}
