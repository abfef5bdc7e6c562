//! In-memory `PortalPage` for unit tests.
//!
//! Visibility is a fixed set of locators (optionally grown by clicks), every
//! interaction is recorded, and nothing ever waits.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{AppError, AppResult, BrowserError, PortalError};
use crate::infrastructure::{Locator, PortalPage, RowLink};
use crate::services::selectors;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageAction {
    Goto(String),
    Click(String),
    ClickNth(String, usize),
    Fill(String, String),
    ChooseOption(usize, usize),
    NetworkIdle,
}

type FillHook = Box<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct State {
    visible: HashSet<String>,
    counts: HashMap<String, usize>,
    reveal_on_click: HashMap<String, Vec<String>>,
    rows: Vec<RowLink>,
    dropdowns: Vec<Vec<String>>,
    actions: Vec<PageAction>,
    failing_evaluations: usize,
}

#[derive(Default)]
pub(crate) struct ScriptedPage {
    state: Mutex<State>,
    on_fill: Option<FillHook>,
}

impl ScriptedPage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn visible(self, locator: Locator) -> Self {
        self.state.lock().unwrap().visible.insert(locator.to_string());
        self
    }

    pub(crate) fn visible_all(mut self, locators: &[Locator]) -> Self {
        for locator in locators {
            self = self.visible(*locator);
        }
        self
    }

    pub(crate) fn with_count(self, locator: Locator, count: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .counts
            .insert(locator.to_string(), count);
        self
    }

    /// Clicking `trigger` makes `target` visible
    pub(crate) fn reveal_on_click(self, trigger: Locator, target: Locator) -> Self {
        self.state
            .lock()
            .unwrap()
            .reveal_on_click
            .entry(trigger.to_string())
            .or_default()
            .push(target.to_string());
        self
    }

    pub(crate) fn rows(self, rows: Vec<RowLink>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state
                .counts
                .insert(selectors::RESULT_LINKS.to_string(), rows.len());
            state.rows = rows;
        }
        self
    }

    pub(crate) fn dropdowns(self, dropdowns: Vec<Vec<&str>>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state
                .counts
                .insert(selectors::DROPDOWNS.to_string(), dropdowns.len());
            state.dropdowns = dropdowns
                .into_iter()
                .map(|options| options.into_iter().map(str::to_string).collect())
                .collect();
        }
        self
    }

    /// The next `n` visibility/count evaluations fail as if the page navigated away
    pub(crate) fn failing_evaluations(self, n: usize) -> Self {
        self.state.lock().unwrap().failing_evaluations = n;
        self
    }

    pub(crate) fn on_fill(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_fill = Some(Box::new(hook));
        self
    }

    pub(crate) fn actions(&self) -> Vec<PageAction> {
        self.state.lock().unwrap().actions.clone()
    }

    pub(crate) fn clicked(&self, locator: Locator) -> bool {
        let key = locator.to_string();
        self.actions().iter().any(|action| match action {
            PageAction::Click(k) | PageAction::ClickNth(k, _) => *k == key,
            _ => false,
        })
    }

    fn record(&self, action: PageAction) {
        self.state.lock().unwrap().actions.push(action);
    }

    fn evaluate(&self) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_evaluations == 0 {
            return Ok(());
        }
        state.failing_evaluations -= 1;
        Err(AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: "Execution context was destroyed".into(),
        }))
    }

    fn is_shown(&self, locator: Locator) -> bool {
        self.state
            .lock()
            .unwrap()
            .visible
            .contains(&locator.to_string())
    }

    fn ensure_visible(&self, locator: Locator) -> AppResult<()> {
        if self.is_shown(locator) {
            Ok(())
        } else {
            Err(PortalError::ElementNotVisible {
                locator: locator.to_string(),
            }
            .into())
        }
    }

    fn reveal(&self, trigger: Locator) {
        let mut state = self.state.lock().unwrap();
        if let Some(targets) = state.reveal_on_click.get(&trigger.to_string()).cloned() {
            state.visible.extend(targets);
        }
    }
}

#[async_trait]
impl PortalPage for ScriptedPage {
    async fn goto(&self, url: &str) -> AppResult<()> {
        self.record(PageAction::Goto(url.to_string()));
        Ok(())
    }

    async fn is_visible(&self, locator: Locator) -> AppResult<bool> {
        self.evaluate()?;
        Ok(self.is_shown(locator))
    }

    async fn wait_for(&self, locator: Locator, _timeout: Duration) -> AppResult<bool> {
        Ok(self.is_shown(locator))
    }

    async fn count(&self, locator: Locator) -> AppResult<usize> {
        self.evaluate()?;
        let key = locator.to_string();
        let state = self.state.lock().unwrap();
        Ok(state
            .counts
            .get(&key)
            .copied()
            .unwrap_or(usize::from(state.visible.contains(&key))))
    }

    async fn click(&self, locator: Locator) -> AppResult<()> {
        self.ensure_visible(locator)?;
        self.record(PageAction::Click(locator.to_string()));
        self.reveal(locator);
        Ok(())
    }

    async fn click_nth(&self, locator: Locator, index: usize) -> AppResult<()> {
        let len = self.count(locator).await?;
        if index >= len {
            return Err(PortalError::IndexOutOfRange {
                locator: locator.to_string(),
                index,
                len,
            }
            .into());
        }
        self.record(PageAction::ClickNth(locator.to_string(), index));
        Ok(())
    }

    async fn fill(&self, locator: Locator, value: &str) -> AppResult<()> {
        self.ensure_visible(locator)?;
        self.record(PageAction::Fill(locator.to_string(), value.to_string()));
        if let Some(hook) = &self.on_fill {
            hook(value);
        }
        Ok(())
    }

    async fn row_links(&self, _locator: Locator) -> AppResult<Vec<RowLink>> {
        Ok(self.state.lock().unwrap().rows.clone())
    }

    async fn dropdown_options(&self, index: usize) -> AppResult<Vec<String>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .dropdowns
            .get(index)
            .cloned()
            .unwrap_or_default())
    }

    async fn choose_option(&self, dropdown: usize, option: usize) -> AppResult<()> {
        self.record(PageAction::ChooseOption(dropdown, option));
        Ok(())
    }

    async fn wait_for_network_idle(&self) -> AppResult<()> {
        self.record(PageAction::NetworkIdle);
        Ok(())
    }
}
