//! Decision form - business capability layer
//!
//! Opens the "Recommend Offer or Reject" form on a student record and fills
//! it in for an offer or a rejection.

use tokio::time::sleep;

use crate::config::Timeouts;
use crate::error::{AppResult, PortalError};
use crate::infrastructure::{wait_for_any, wait_for_count, Locator, PortalPage};
use crate::services::reason_matcher::{require_reason, ReasonTier};
use crate::services::selectors::{
    ACTIONS_TAB, DECISION_RADIOS, DROPDOWNS, OFFER_OPTION, PROCESS_BUTTON, RECOMMEND_LINK,
    REJECT_LABEL,
};
use crate::services::Reporter;

/// Second `<select>` on the reject form holds the reason codes
const REASON_DROPDOWN: usize = 1;
const REQUIRED_DROPDOWNS: usize = 2;

/// How a decision form was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Submitted,
    /// Dry run: filled in but not submitted
    HeldForInspection,
}

pub struct DecisionForm {
    reporter: Reporter,
    timeouts: Timeouts,
    dry_run: bool,
}

impl DecisionForm {
    pub fn new(reporter: Reporter, timeouts: Timeouts, dry_run: bool) -> Self {
        Self {
            reporter,
            timeouts,
            dry_run,
        }
    }

    pub async fn open_actions_tab(&self, page: &dyn PortalPage) -> AppResult<()> {
        self.reporter.log("Clicking Actions tab...");
        self.require_visible(page, &[ACTIONS_TAB]).await?;
        page.click(ACTIONS_TAB).await?;
        self.settle(page).await
    }

    pub async fn open_recommendation_form(&self, page: &dyn PortalPage) -> AppResult<()> {
        self.reporter.log("Clicking 'Recommend Offer or Reject'...");
        let link = self.require_visible(page, RECOMMEND_LINK).await?;
        page.click(link).await?;
        self.settle(page).await
    }

    /// Accept: pick "Offer recommendation" and submit. Not affected by dry run.
    pub async fn recommend_offer(&self, page: &dyn PortalPage) -> AppResult<Submission> {
        self.open_recommendation_form(page).await?;

        self.reporter.log("Selecting 'Offer recommendation'...");
        self.require_visible(page, &[OFFER_OPTION]).await?;
        page.click(OFFER_OPTION).await?;

        self.submit(page).await?;
        self.reporter.log("Offer recommendation processed.");
        Ok(Submission::Submitted)
    }

    pub async fn recommend_reject(&self, page: &dyn PortalPage) -> AppResult<Submission> {
        self.open_recommendation_form(page).await?;

        self.reporter.log("Selecting 'Reject' radio button...");
        let radios = page.count(DECISION_RADIOS).await?;
        self.reporter
            .log(format!("Found {} radio buttons", radios));
        if radios >= 2 {
            page.click_nth(DECISION_RADIOS, 1).await?;
        } else {
            page.click(REJECT_LABEL).await?;
        }
        sleep(self.timeouts.settle).await;

        self.reporter.log("Waiting for reason dropdowns...");
        let found = wait_for_count(page, DROPDOWNS, REQUIRED_DROPDOWNS, self.timeouts.dropdown).await?;
        if found < REQUIRED_DROPDOWNS {
            return Err(PortalError::FormShape {
                control: "select",
                expected: REQUIRED_DROPDOWNS,
                found,
            }
            .into());
        }

        let options = page.dropdown_options(REASON_DROPDOWN).await?;
        let choice = require_reason(&options)?;
        page.choose_option(REASON_DROPDOWN, choice.index).await?;
        let rule = match choice.tier {
            ReasonTier::Numbered => "numbered",
            ReasonTier::Oversubscribed => "oversubscribed",
        };
        self.reporter.log(format!(
            "Selected reason: '{}' ({} rule)",
            options[choice.index], rule
        ));

        if self.dry_run {
            self.reporter
                .log("[DRY RUN] Form filled, not submitting. Inspect the browser.");
            return Ok(Submission::HeldForInspection);
        }

        self.submit(page).await?;
        self.reporter.log("Rejection processed.");
        Ok(Submission::Submitted)
    }

    pub async fn submit(&self, page: &dyn PortalPage) -> AppResult<()> {
        self.reporter.log("Clicking Process...");
        let button = self.require_visible(page, PROCESS_BUTTON).await?;
        page.click(button).await?;
        self.settle(page).await
    }

    async fn require_visible(
        &self,
        page: &dyn PortalPage,
        candidates: &[Locator],
    ) -> AppResult<Locator> {
        match wait_for_any(page, candidates, self.timeouts.probe).await? {
            Some(found) => Ok(found),
            None => Err(PortalError::ElementNotVisible {
                locator: candidates
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" | "),
            }
            .into()),
        }
    }

    async fn settle(&self, page: &dyn PortalPage) -> AppResult<()> {
        page.wait_for_network_idle().await?;
        sleep(self.timeouts.settle).await;
        Ok(())
    }
}
