//! Navigator - business capability layer
//!
//! Brings the portal back to the student search page.

use crate::error::AppResult;
use crate::infrastructure::{Locator, PortalPage};
use crate::services::selectors::{SEARCH_TAB, SELECT_ENTRY};
use crate::services::Reporter;

pub struct Navigator {
    reporter: Reporter,
}

impl Navigator {
    pub fn new(reporter: Reporter) -> Self {
        Self { reporter }
    }

    /// Clicks the "UCLSelect" entry and the "Search" tab when present.
    ///
    /// Always `Ok(true)`: the search form itself is not verified here.
    pub async fn to_search_entry(&self, page: &dyn PortalPage) -> AppResult<bool> {
        self.reporter.log("Navigating to UCLSelect...");
        self.click_if_visible(page, SELECT_ENTRY).await?;

        self.reporter.log("Clicking Search tab...");
        self.click_if_visible(page, SEARCH_TAB).await?;

        self.reporter.log("Ready to search.");
        Ok(true)
    }

    async fn click_if_visible(&self, page: &dyn PortalPage, locator: Locator) -> AppResult<()> {
        if page.is_visible(locator).await? {
            page.click(locator).await?;
            page.wait_for_network_idle().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scripted_page::{PageAction, ScriptedPage};

    #[tokio::test]
    async fn absent_elements_are_skipped() {
        let page = ScriptedPage::new();
        let navigator = Navigator::new(Reporter::new(8));

        assert!(navigator.to_search_entry(&page).await.unwrap());
        assert!(page.actions().is_empty());
    }

    #[tokio::test]
    async fn clicks_entry_then_search_tab() {
        let page = ScriptedPage::new().visible(SELECT_ENTRY).visible(SEARCH_TAB);
        let navigator = Navigator::new(Reporter::new(8));

        assert!(navigator.to_search_entry(&page).await.unwrap());
        assert_eq!(
            page.actions(),
            vec![
                PageAction::Click(SELECT_ENTRY.to_string()),
                PageAction::NetworkIdle,
                PageAction::Click(SEARCH_TAB.to_string()),
                PageAction::NetworkIdle,
            ]
        );
    }
}
