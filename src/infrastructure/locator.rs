//! Element locators
//!
//! A locator describes how to find elements; it does not hold a handle.
//! Fallback chains are plain `&[Locator]` slices resolved by [`first_visible`].

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::PortalPage;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// ARIA roles used by the portal workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    Textbox,
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// CSS selector
    Css { selector: &'static str },
    /// Smallest elements whose text contains `text` (case-insensitive)
    Text { text: &'static str },
    /// CSS selector filtered by contained text
    CssWithText {
        selector: &'static str,
        text: &'static str,
    },
    /// Elements by ARIA role, optionally by accessible name
    Role {
        role: AriaRole,
        name: Option<&'static str>,
    },
    /// Form control associated with a `<label>` containing `text`
    Label { text: &'static str },
}

impl Locator {
    pub const fn css(selector: &'static str) -> Self {
        Locator::Css { selector }
    }

    pub const fn text(text: &'static str) -> Self {
        Locator::Text { text }
    }

    pub const fn css_with_text(selector: &'static str, text: &'static str) -> Self {
        Locator::CssWithText { selector, text }
    }

    pub const fn role(role: AriaRole, name: Option<&'static str>) -> Self {
        Locator::Role { role, name }
    }

    pub const fn label(text: &'static str) -> Self {
        Locator::Label { text }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css { selector } => write!(f, "css={}", selector),
            Locator::Text { text } => write!(f, "text={}", text),
            Locator::CssWithText { selector, text } => {
                write!(f, "css={} >> has-text={}", selector, text)
            }
            Locator::Role { role, name: None } => write!(f, "role={:?}", role),
            Locator::Role {
                role,
                name: Some(name),
            } => write!(f, "role={:?}[name={}]", role, name),
            Locator::Label { text } => write!(f, "label={}", text),
        }
    }
}

/// First candidate whose first match is visible, in priority order.
pub async fn first_visible(
    page: &dyn PortalPage,
    candidates: &[Locator],
) -> AppResult<Option<Locator>> {
    for candidate in candidates {
        if page.is_visible(*candidate).await? {
            return Ok(Some(*candidate));
        }
    }
    Ok(None)
}

/// Polls [`first_visible`] until one candidate shows up or `timeout` elapses.
///
/// Evaluation errors (the page navigating away mid-probe) count as "not yet".
pub async fn wait_for_any(
    page: &dyn PortalPage,
    candidates: &[Locator],
    timeout: Duration,
) -> AppResult<Option<Locator>> {
    let deadline = Instant::now() + timeout;
    loop {
        match first_visible(page, candidates).await {
            Ok(Some(found)) => return Ok(Some(found)),
            Ok(None) => {}
            Err(e) => debug!("visibility probe for {} candidates failed: {}", candidates.len(), e),
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

/// Polls until `locator` matches at least `min` elements; returns the last
/// count read successfully (0 if none was).
pub async fn wait_for_count(
    page: &dyn PortalPage,
    locator: Locator,
    min: usize,
    timeout: Duration,
) -> AppResult<usize> {
    let deadline = Instant::now() + timeout;
    let mut count = 0;
    loop {
        match page.count(locator).await {
            Ok(n) => count = n,
            Err(e) => debug!("count probe for {} failed: {}", locator, e),
        }
        let now = Instant::now();
        if count >= min || now >= deadline {
            return Ok(count);
        }
        sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}
