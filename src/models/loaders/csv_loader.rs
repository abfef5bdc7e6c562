use crate::error::{AppResult, FileError};
use crate::models::record::DecisionRecord;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Column positions found in the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnMap {
    pub student_no: Option<usize>,
    pub decision: Option<usize>,
    pub name: Option<usize>,
    pub programme: Option<usize>,
}

/// Detects the columns in two passes: exact header names first, then looser
/// patterns for whatever is still missing.
pub fn detect_columns<S: AsRef<str>>(headers: &[S]) -> ColumnMap {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();
    let mut map = ColumnMap::default();

    for (col, header) in normalized.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        let h = header.as_str();

        if map.student_no.is_none()
            && matches!(
                h,
                "studentno" | "student_no" | "student number" | "student id" | "id"
            )
        {
            map.student_no = Some(col);
        }
        if map.decision.is_none() && matches!(h, "decision" | "status" | "offer") {
            map.decision = Some(col);
        }
        if map.name.is_none() && matches!(h, "name" | "applicant name" | "student name") {
            map.name = Some(col);
        }
        if map.programme.is_none() && h == "programme" {
            map.programme = Some(col);
        }
    }

    for (col, header) in normalized.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        let h = header.as_str();

        if map.student_no.is_none() && h.contains("student") && h.contains("no") {
            map.student_no = Some(col);
        }
        if map.decision.is_none() && h.contains("decision") {
            map.decision = Some(col);
        }
        if map.programme.is_none()
            && matches!(h, "prog" | "progcode" | "prog code" | "progshort" | "route")
        {
            map.programme = Some(col);
        }
    }

    map
}

/// Reads decision records from CSV data with a header row
pub fn read_records<R: Read>(reader: R) -> AppResult<Vec<DecisionRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    for (col, header) in headers.iter().enumerate() {
        debug!("Column {}: '{}'", col + 1, header);
    }

    let columns = detect_columns(&headers);
    debug!("Detected columns: {:?}", columns);

    let student_col = columns
        .student_no
        .ok_or(FileError::MissingColumn { column: "StudentNo" })?;
    let decision_col = columns
        .decision
        .ok_or(FileError::MissingColumn { column: "Decision" })?;
    if columns.programme.is_none() {
        warn!("⚠️ Programme column not found! Row matching will fail for every record.");
    }

    let cell = |row: &csv::StringRecord, col: Option<usize>| -> String {
        col.and_then(|c| row.get(c))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let student_no = cell(&row, Some(student_col));
        if student_no.is_empty() {
            continue;
        }

        let record = DecisionRecord::new(
            student_no,
            cell(&row, Some(decision_col)),
            cell(&row, columns.name),
            cell(&row, columns.programme),
        );

        if records.len() < 5 {
            debug!(
                "Loaded: StudentNo={}, Decision={}, Programme='{}'",
                record.student_id, record.decision, record.programme_code
            );
        }
        records.push(record);
    }

    Ok(records)
}

/// Loads decision records from a CSV file
pub async fn load_records_from_csv(path: &Path) -> Result<Vec<DecisionRecord>> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read records file: {}", path.display()))?;

    let records = read_records(bytes.as_slice())
        .with_context(|| format!("Cannot parse records file: {}", path.display()))?;

    info!(
        "✓ Loaded {} records from {}",
        records.len(),
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    Ok(records)
}
