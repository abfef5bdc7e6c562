//! `PortalPage` backed by a live Chromium page
//!
//! Every operation is a small script built from [`PRELUDE`] plus the locator
//! serialized as JSON, evaluated through the [`JsExecutor`].

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{AppResult, PortalError};
use crate::infrastructure::{JsExecutor, Locator, PortalPage, RowLink};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// No new resource requests for this long counts as quiescent
const QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Shared helpers: `__find(loc)` returns matching elements, `__visible(el)`.
const PRELUDE: &str = r#"
const __norm = (t) => (t || '').replace(/\s+/g, ' ').trim();
const __text = (el) => __norm(el.innerText || el.textContent || el.value || '');
const __visible = (el) => {
    if (!el || !el.isConnected) return false;
    const style = window.getComputedStyle(el);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
};
const __find = (loc) => {
    switch (loc.kind) {
        case 'css':
            return Array.from(document.querySelectorAll(loc.selector));
        case 'css_with_text': {
            const needle = loc.text.toLowerCase();
            return Array.from(document.querySelectorAll(loc.selector))
                .filter((el) => __text(el).toLowerCase().includes(needle)
                    || (el.value || '').toLowerCase().includes(needle));
        }
        case 'text': {
            const needle = loc.text.toLowerCase();
            const hits = new Set(Array.from(document.body.querySelectorAll('*'))
                .filter((el) => !['SCRIPT', 'STYLE'].includes(el.tagName))
                .filter((el) => __text(el).toLowerCase().includes(needle)));
            return Array.from(hits).filter((el) => !Array.from(el.children).some((c) => hits.has(c)));
        }
        case 'role': {
            const selector = loc.role === 'textbox'
                ? "input:not([type]), input[type='text'], input[type='search'], input[type='number'], textarea, [role='textbox']"
                : "button, input[type='button'], input[type='submit'], [role='button']";
            let els = Array.from(document.querySelectorAll(selector));
            if (loc.name) {
                els = els.filter((el) => [
                    el.getAttribute('aria-label'),
                    el.getAttribute('title'),
                    el.value,
                    __text(el),
                    el.labels && el.labels.length ? __text(el.labels[0]) : null,
                ].some((n) => n && __norm(n).includes(loc.name)));
            }
            return els;
        }
        case 'label':
            return Array.from(document.querySelectorAll('label'))
                .filter((l) => __text(l).includes(loc.text))
                .map((l) => l.control
                    || (l.htmlFor && document.getElementById(l.htmlFor))
                    || l.querySelector('input, select, textarea'))
                .filter(Boolean);
    }
    return [];
};
"#;

#[derive(Debug, Deserialize)]
struct ActionOutcome {
    ok: bool,
    #[serde(default)]
    len: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadState {
    ready_state: String,
    resources: usize,
}

pub struct ChromePage {
    executor: JsExecutor,
    /// Pause after every click/fill
    action_delay: Duration,
    /// Bound for clicks waiting on visibility and for quiescence
    action_timeout: Duration,
}

impl ChromePage {
    pub fn new(executor: JsExecutor, action_delay: Duration, action_timeout: Duration) -> Self {
        Self {
            executor,
            action_delay,
            action_timeout,
        }
    }

    fn script(locator: Locator, body: &str) -> AppResult<String> {
        Ok(format!(
            "(() => {{ {} const loc = {}; {} }})()",
            PRELUDE,
            serde_json::to_string(&locator)?,
            body
        ))
    }

    /// Clicks the `index`-th match. The click is deferred so a navigation it
    /// triggers cannot tear down the evaluation context mid-call.
    async fn click_index(&self, locator: Locator, index: usize) -> AppResult<()> {
        if index == 0 && !self.wait_for(locator, self.action_timeout).await? {
            return Err(PortalError::ElementNotVisible {
                locator: locator.to_string(),
            }
            .into());
        }

        let body = format!(
            r#"const els = __find(loc);
            const el = els[{index}];
            if (!el) return {{ ok: false, len: els.length }};
            el.scrollIntoView({{ block: 'center' }});
            setTimeout(() => el.click(), 0);
            return {{ ok: true, len: els.length }};"#
        );
        let outcome: ActionOutcome = self.executor.eval_as(Self::script(locator, &body)?).await?;
        if !outcome.ok {
            return Err(PortalError::IndexOutOfRange {
                locator: locator.to_string(),
                index,
                len: outcome.len,
            }
            .into());
        }
        sleep(self.action_delay).await;
        Ok(())
    }

    async fn load_state(&self) -> AppResult<LoadState> {
        self.executor
            .eval_as(
                "({ readyState: document.readyState, \
                   resources: performance.getEntriesByType('resource').length })",
            )
            .await
    }
}

#[async_trait]
impl PortalPage for ChromePage {
    async fn goto(&self, url: &str) -> AppResult<()> {
        self.executor.navigate(url).await?;
        self.wait_for_network_idle().await
    }

    async fn is_visible(&self, locator: Locator) -> AppResult<bool> {
        self.executor
            .eval_as(Self::script(locator, "return __visible(__find(loc)[0]);")?)
            .await
    }

    async fn wait_for(&self, locator: Locator, timeout: Duration) -> AppResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            // The page may be mid-navigation; treat evaluation errors as "not yet".
            match self.is_visible(locator).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => debug!("visibility probe for {} failed: {}", locator, e),
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn count(&self, locator: Locator) -> AppResult<usize> {
        self.executor
            .eval_as(Self::script(locator, "return __find(loc).length;")?)
            .await
    }

    async fn click(&self, locator: Locator) -> AppResult<()> {
        debug!("click {}", locator);
        self.click_index(locator, 0).await
    }

    async fn click_nth(&self, locator: Locator, index: usize) -> AppResult<()> {
        debug!("click {} [{}]", locator, index);
        self.click_index(locator, index).await
    }

    async fn fill(&self, locator: Locator, value: &str) -> AppResult<()> {
        if !self.wait_for(locator, self.action_timeout).await? {
            return Err(PortalError::ElementNotVisible {
                locator: locator.to_string(),
            }
            .into());
        }
        let body = format!(
            r#"const el = __find(loc)[0];
            if (!el) return {{ ok: false }};
            el.focus();
            el.value = '';
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.value = {};
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return {{ ok: true }};"#,
            serde_json::to_string(value)?
        );
        let outcome: ActionOutcome = self.executor.eval_as(Self::script(locator, &body)?).await?;
        if !outcome.ok {
            return Err(PortalError::ElementNotVisible {
                locator: locator.to_string(),
            }
            .into());
        }
        sleep(self.action_delay).await;
        Ok(())
    }

    async fn row_links(&self, locator: Locator) -> AppResult<Vec<RowLink>> {
        let body = r#"return __find(loc).map((a) => {
                const row = a.closest('tr');
                return {
                    linkText: __text(a),
                    href: a.getAttribute('href') || '',
                    rowText: row ? (row.innerText || row.textContent || '') : '',
                };
            });"#;
        self.executor.eval_as(Self::script(locator, body)?).await
    }

    async fn dropdown_options(&self, index: usize) -> AppResult<Vec<String>> {
        let body = format!(
            r#"const select = document.querySelectorAll('select')[{index}];
            if (!select) return [];
            return Array.from(select.options).map((o) => o.text);"#
        );
        self.executor
            .eval_as(Self::script(Locator::css("select"), &body)?)
            .await
    }

    async fn choose_option(&self, dropdown: usize, option: usize) -> AppResult<()> {
        let body = format!(
            r#"const selects = document.querySelectorAll('select');
            const select = selects[{dropdown}];
            if (!select) return {{ ok: false, len: selects.length }};
            if ({option} >= select.options.length) return {{ ok: false, len: select.options.length }};
            select.selectedIndex = {option};
            select.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return {{ ok: true, len: select.options.length }};"#
        );
        let outcome: ActionOutcome = self
            .executor
            .eval_as(Self::script(Locator::css("select"), &body)?)
            .await?;
        if !outcome.ok {
            return Err(PortalError::IndexOutOfRange {
                locator: format!("select[{}] option", dropdown),
                index: option,
                len: outcome.len,
            }
            .into());
        }
        sleep(self.action_delay).await;
        Ok(())
    }

    async fn wait_for_network_idle(&self) -> AppResult<()> {
        let started = Instant::now();
        let mut last_resources = None;
        let mut quiet_since = Instant::now();

        loop {
            match self.load_state().await {
                Ok(state) if state.ready_state == "complete" => {
                    if last_resources != Some(state.resources) {
                        last_resources = Some(state.resources);
                        quiet_since = Instant::now();
                    } else if quiet_since.elapsed() >= QUIET_WINDOW {
                        return Ok(());
                    }
                }
                Ok(_) => last_resources = None,
                Err(e) => {
                    debug!("load state probe failed (navigating?): {}", e);
                    last_resources = None;
                }
            }

            if started.elapsed() >= self.action_timeout {
                return Err(PortalError::Timeout {
                    what: "network idle".to_string(),
                    waited: self.action_timeout,
                }
                .into());
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
