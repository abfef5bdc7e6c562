//! Student search - business capability layer
//!
//! Submits a student-number search and picks the result row whose text holds
//! both the student number and the programme search token.

use std::fmt;
use tokio::time::sleep;

use crate::config::Timeouts;
use crate::error::{AppResult, PortalError};
use crate::infrastructure::{first_visible, PortalPage, RowLink};
use crate::models::{resolve_search_token, DecisionRecord};
use crate::services::selectors::{
    RESULTS_TABLE, RESULT_LINKS, SEARCH_BUTTON, SEARCH_INPUT, SEARCH_MODE,
};
use crate::services::Reporter;
use crate::utils::logging::truncate_text;

/// Outcome of testing one result row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCheck {
    pub index: usize,
    pub link_text: String,
    pub has_student_no: bool,
    pub has_prog_code: bool,
}

impl RowCheck {
    pub fn matches(&self) -> bool {
        self.has_student_no && self.has_prog_code
    }
}

impl fmt::Display for RowCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} '{}' studentNo={} progCode={}",
            self.index,
            self.link_text.trim(),
            self.has_student_no,
            self.has_prog_code
        )
    }
}

/// Tests rows in document order and stops at the first full match.
///
/// Returns the matching index (if any) and every row tested so far.
pub fn scan_rows(rows: &[RowLink], student_id: &str, token: &str) -> (Option<usize>, Vec<RowCheck>) {
    let mut checks = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let check = RowCheck {
            index,
            link_text: row.link_text.clone(),
            has_student_no: row.row_text.contains(student_id),
            has_prog_code: row.row_text.contains(token),
        };
        let matched = check.matches();
        checks.push(check);
        if matched {
            return (Some(index), checks);
        }
    }
    (None, checks)
}

/// The row chosen for a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRow {
    pub index: usize,
    pub link: RowLink,
}

pub struct StudentSearch {
    reporter: Reporter,
    timeouts: Timeouts,
}

impl StudentSearch {
    pub fn new(reporter: Reporter, timeouts: Timeouts) -> Self {
        Self { reporter, timeouts }
    }

    pub async fn search(&self, page: &dyn PortalPage, student_id: &str) -> AppResult<()> {
        self.reporter.log(format!("Searching: {}", student_id));

        if page.is_visible(SEARCH_MODE).await? {
            page.click(SEARCH_MODE).await?;
        }

        let input = first_visible(page, SEARCH_INPUT)
            .await?
            .ok_or(PortalError::SearchInputNotFound)?;
        page.click(input).await?;
        page.fill(input, student_id).await?;

        // The last candidate is used even if nothing reported visible.
        let button = first_visible(page, SEARCH_BUTTON)
            .await?
            .unwrap_or(SEARCH_BUTTON[SEARCH_BUTTON.len() - 1]);
        page.click(button).await?;
        page.wait_for_network_idle().await?;
        sleep(self.timeouts.settle).await;
        Ok(())
    }

    pub async fn match_row(
        &self,
        page: &dyn PortalPage,
        record: &DecisionRecord,
    ) -> AppResult<MatchedRow> {
        self.reporter.log(format!(
            "Looking for student {} with Prog '{}'",
            record.student_id, record.programme_code
        ));

        if !page.wait_for(RESULTS_TABLE, self.timeouts.results_table).await? {
            return Err(PortalError::ResultsTableMissing {
                waited: self.timeouts.results_table,
            }
            .into());
        }
        sleep(self.timeouts.settle).await;

        let raw = record.programme_code.trim();
        let token = resolve_search_token(raw);
        if token.is_empty() {
            return Err(PortalError::EmptyProgramme {
                student_id: record.student_id.clone(),
            }
            .into());
        }
        if token != raw {
            self.reporter.log(format!("Mapped '{}' -> '{}'", raw, token));
        }

        let rows = page.row_links(RESULT_LINKS).await?;
        self.reporter
            .log(format!("Found {} links in result rows", rows.len()));

        let (matched, checks) = scan_rows(&rows, &record.student_id, &token);
        for check in &checks {
            self.reporter.log(format!(
                "Link {}: '{}' | StudentNo={} | ProgCode={}",
                check.index,
                check.link_text.trim(),
                check.has_student_no,
                check.has_prog_code
            ));
        }

        match matched {
            Some(index) => {
                let link = rows[index].clone();
                self.reporter.log(format!(
                    ">>> Found matching link! href: {}",
                    truncate_text(&link.href, 50)
                ));
                Ok(MatchedRow { index, link })
            }
            None => Err(PortalError::NoMatchingRow {
                student_id: record.student_id.clone(),
                token: token.into_owned(),
                scanned: checks.iter().map(ToString::to_string).collect(),
            }
            .into()),
        }
    }

    /// Search, match, then follow the matched row's link
    pub async fn open_record(&self, page: &dyn PortalPage, record: &DecisionRecord) -> AppResult<()> {
        self.search(page, &record.student_id).await?;
        let matched = self.match_row(page, record).await?;

        self.reporter.log("Clicking the matched link...");
        page.click_nth(RESULT_LINKS, matched.index).await?;
        page.wait_for_network_idle().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::infrastructure::scripted_page::{PageAction, ScriptedPage};

    fn rows() -> Vec<RowLink> {
        vec![
            RowLink::new("Smith", "/a", "12345678 Smith TMSCOMSML01 2025"),
            RowLink::new("Smith", "/b", "12345678 Smith TMSCOMSING01 2025"),
            RowLink::new("Jones", "/c", "87654321 Jones TMSCOMSING01 2025"),
        ]
    }

    fn search() -> StudentSearch {
        StudentSearch::new(Reporter::new(64), Timeouts::immediate())
    }

    #[test]
    fn scan_requires_both_predicates() {
        let (matched, checks) = scan_rows(&rows(), "12345678", "TMSCOMSING01");
        assert_eq!(matched, Some(1));
        assert_eq!(checks.len(), 2);
        assert!(checks[0].has_student_no);
        assert!(!checks[0].has_prog_code);
    }

    #[test]
    fn scan_picks_first_of_several_matches() {
        let mut rows = rows();
        rows.push(RowLink::new("Smith", "/d", "12345678 Smith TMSCOMSING01 2026"));
        let (matched, _) = scan_rows(&rows, "12345678", "TMSCOMSING01");
        assert_eq!(matched, Some(1));
    }

    #[test]
    fn scan_reports_every_row_when_nothing_matches() {
        let (matched, checks) = scan_rows(&rows(), "12345678", "TMSCOMSCGV01");
        assert_eq!(matched, None);
        assert_eq!(checks.len(), 3);
        assert_eq!(checks[2].to_string(), "#2 'Jones' studentNo=false progCode=false");
    }

    #[tokio::test]
    async fn match_row_uses_mapped_programme_token() {
        let page = ScriptedPage::new().visible(RESULTS_TABLE).rows(rows());
        let record = DecisionRecord::new("12345678", "Reject", "Smith", "cs");

        let matched = search().match_row(&page, &record).await.unwrap();
        assert_eq!(matched.index, 1);
        assert_eq!(matched.link.href, "/b");
    }

    #[tokio::test]
    async fn match_row_fails_with_diagnostics() {
        let page = ScriptedPage::new().visible(RESULTS_TABLE).rows(rows());
        let record = DecisionRecord::new("12345678", "Reject", "Smith", "CGVI");

        let err = search().match_row(&page, &record).await.unwrap_err();
        match err {
            AppError::Portal(PortalError::NoMatchingRow {
                student_id,
                token,
                scanned,
            }) => {
                assert_eq!(student_id, "12345678");
                assert_eq!(token, "TMSCOMSCGV01");
                assert_eq!(scanned.len(), 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn empty_programme_is_an_error() {
        let page = ScriptedPage::new().visible(RESULTS_TABLE).rows(rows());
        let record = DecisionRecord::new("12345678", "Reject", "Smith", "  ");

        let err = search().match_row(&page, &record).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Portal(PortalError::EmptyProgramme { .. })
        ));
    }

    #[tokio::test]
    async fn missing_table_is_an_error() {
        let page = ScriptedPage::new().rows(rows());
        let record = DecisionRecord::new("12345678", "Reject", "Smith", "CS");

        let err = search().match_row(&page, &record).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Portal(PortalError::ResultsTableMissing { .. })
        ));
    }

    #[tokio::test]
    async fn search_falls_back_to_generic_input_and_button() {
        let page = ScriptedPage::new()
            .visible(SEARCH_INPUT[1])
            .visible(SEARCH_BUTTON[1]);

        search().search(&page, "12345678").await.unwrap();
        assert_eq!(
            page.actions(),
            vec![
                PageAction::Click(SEARCH_INPUT[1].to_string()),
                PageAction::Fill(SEARCH_INPUT[1].to_string(), "12345678".to_string()),
                PageAction::Click(SEARCH_BUTTON[1].to_string()),
                PageAction::NetworkIdle,
            ]
        );
    }

    #[tokio::test]
    async fn search_without_input_fails() {
        let page = ScriptedPage::new().visible(SEARCH_BUTTON[0]);
        let err = search().search(&page, "12345678").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Portal(PortalError::SearchInputNotFound)
        ));
    }
}
