//! Failure writer
//!
//! Appends failed records to the warn file so they can be fixed by hand.

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::models::{DecisionRecord, RecordStatus};

pub struct FailureWriter {
    warn_file_path: String,
}

impl FailureWriter {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// Writes one line per failed record; returns how many were written.
    pub fn write_failures(&self, records: &[DecisionRecord]) -> Result<usize> {
        let failed: Vec<&DecisionRecord> = records
            .iter()
            .filter(|r| r.status() == RecordStatus::Failed)
            .collect();
        if failed.is_empty() {
            return Ok(0);
        }

        debug!("writing {} failures to {}", failed.len(), self.warn_file_path);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)?;

        for record in &failed {
            let line = format!(
                "{} | {} | {} | {} | {}\n",
                record.student_id,
                record.display_name,
                record.decision,
                record.programme_code,
                record.error_message().unwrap_or("unknown error")
            );
            file.write_all(line.as_bytes())?;
        }

        Ok(failed.len())
    }
}
