use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AppResult;
use crate::infrastructure::Locator;

/// An anchor inside a results table row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowLink {
    pub link_text: String,
    pub href: String,
    /// Full text of the enclosing `<tr>`
    pub row_text: String,
}

impl RowLink {
    pub fn new(
        link_text: impl Into<String>,
        href: impl Into<String>,
        row_text: impl Into<String>,
    ) -> Self {
        Self {
            link_text: link_text.into(),
            href: href.into(),
            row_text: row_text.into(),
        }
    }
}

/// The page capabilities the portal workflow needs.
///
/// Single-element operations act on the first element the locator matches.
/// Implementations do not add their own retries; callers choose the timeout.
#[async_trait]
pub trait PortalPage: Send + Sync {
    async fn goto(&self, url: &str) -> AppResult<()>;

    async fn is_visible(&self, locator: Locator) -> AppResult<bool>;

    /// `Ok(false)` when the element is still not visible after `timeout`.
    async fn wait_for(&self, locator: Locator, timeout: Duration) -> AppResult<bool>;

    async fn count(&self, locator: Locator) -> AppResult<usize>;

    async fn click(&self, locator: Locator) -> AppResult<()>;

    async fn click_nth(&self, locator: Locator, index: usize) -> AppResult<()>;

    /// Clears the field, then types `value`.
    async fn fill(&self, locator: Locator, value: &str) -> AppResult<()>;

    /// Every anchor matched by `locator`, in document order, with its row text.
    async fn row_links(&self, locator: Locator) -> AppResult<Vec<RowLink>>;

    /// Option labels of the `index`-th `<select>` on the page.
    async fn dropdown_options(&self, index: usize) -> AppResult<Vec<String>>;

    /// Selects an option and raises a `change` event.
    async fn choose_option(&self, dropdown: usize, option: usize) -> AppResult<()>;

    async fn wait_for_network_idle(&self) -> AppResult<()>;
}
