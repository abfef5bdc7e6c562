//! Session manager
//!
//! Owns the browser session for one run: launch or attach, the human-assisted
//! login wait, and teardown. Closing is idempotent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::browser::connection::connect_to_browser;
use crate::browser::launch::{launch_browser, BrowserProcess};
use crate::config::{Config, Timeouts};
use crate::error::{AppResult, SessionError};
use crate::infrastructure::{ChromePage, JsExecutor, PortalPage};
use crate::services::selectors::{LOGGED_IN_MARKER, LOGIN_BUTTON};
use crate::services::Reporter;

/// Navigates to the portal and waits for an authenticated page.
///
/// `Ok(false)` when the marker never shows up within the login timeout.
pub async fn authenticate(
    page: &dyn PortalPage,
    portal_url: &str,
    timeouts: &Timeouts,
    reporter: &Reporter,
) -> AppResult<bool> {
    reporter.log(format!("Navigating to {}", portal_url));
    page.goto(portal_url).await?;

    if page.wait_for(LOGGED_IN_MARKER, timeouts.probe).await? {
        reporter.log("✓ Already logged in.");
        return Ok(true);
    }

    if page.is_visible(LOGIN_BUTTON).await? {
        reporter.log("Clicking 'Staff and Students Login'...");
        page.click(LOGIN_BUTTON).await?;
    }

    reporter.log(format!(
        "Waiting up to {}s for SSO/MFA to be completed in the browser...",
        timeouts.login.as_secs()
    ));
    if page.wait_for(LOGGED_IN_MARKER, timeouts.login).await? {
        reporter.log("✓ Login successful.");
        Ok(true)
    } else {
        reporter.warn("Login timed out.");
        Ok(false)
    }
}

struct RunContext {
    page: Arc<dyn PortalPage>,
    /// `None` for scripted pages
    process: Option<BrowserProcess>,
    /// Attached browsers belong to the user and are left running
    attached: bool,
    /// Throw-away profile removed on close
    temp_profile: Option<PathBuf>,
}

pub struct SessionManager {
    config: Config,
    reporter: Reporter,
    run: Option<RunContext>,
}

impl SessionManager {
    pub fn new(config: Config, reporter: Reporter) -> Self {
        Self {
            config,
            reporter,
            run: None,
        }
    }

    /// Session around an existing page, without a browser process
    #[cfg(test)]
    pub(crate) fn with_page(config: Config, reporter: Reporter, page: Arc<dyn PortalPage>) -> Self {
        Self {
            config,
            reporter,
            run: Some(RunContext {
                page,
                process: None,
                attached: false,
                temp_profile: None,
            }),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.run.is_some()
    }

    pub async fn initialize(&mut self) -> AppResult<()> {
        if self.run.is_some() {
            return Err(SessionError::AlreadyInitialized.into());
        }

        let action_delay = self.config.action_delay();
        let action_timeout = self.config.timeouts().action;

        let (process, page, attached, temp_profile) = match self.config.browser_debug_port {
            Some(port) => {
                self.reporter
                    .log(format!("Attaching to running browser on port {}...", port));
                let (process, page) = connect_to_browser(port).await?;
                (process, page, true, None)
            }
            None => {
                let (profile_dir, temp_profile) = self.prepare_profile()?;
                self.reporter.log(format!(
                    "Launching browser (profile: {}, headless: {})...",
                    profile_dir.display(),
                    self.config.headless
                ));
                match launch_browser(&self.config, &profile_dir).await {
                    Ok((process, page)) => (process, page, false, temp_profile),
                    Err(e) => {
                        if let Some(dir) = &temp_profile {
                            remove_profile(dir);
                        }
                        return Err(e);
                    }
                }
            }
        };

        let page = ChromePage::new(JsExecutor::new(page), action_delay, action_timeout);
        self.run = Some(RunContext {
            page: Arc::new(page),
            process: Some(process),
            attached,
            temp_profile,
        });
        info!("session initialised");
        Ok(())
    }

    /// Current page; fails before `initialize` and after `close`
    pub fn page(&self) -> AppResult<Arc<dyn PortalPage>> {
        self.run
            .as_ref()
            .map(|run| Arc::clone(&run.page))
            .ok_or_else(|| SessionError::NotInitialized.into())
    }

    pub async fn login(&self) -> AppResult<bool> {
        let page = self.page()?;
        authenticate(
            page.as_ref(),
            &self.config.portal_url,
            &self.config.timeouts(),
            &self.reporter,
        )
        .await
    }

    /// Releases the session. No-op when already closed or never opened.
    pub async fn close(&mut self) {
        let Some(run) = self.run.take() else {
            debug!("close: no open session");
            return;
        };
        self.reporter.log("Closing browser...");

        if let Some(mut process) = run.process {
            if run.attached {
                debug!("leaving attached browser running");
            } else {
                if let Err(e) = process.browser.close().await {
                    warn!("browser close failed: {}", e);
                }
                if let Err(e) = process.browser.wait().await {
                    warn!("waiting for browser exit failed: {}", e);
                }
            }
            process.handler.abort();
        }

        if let Some(dir) = &run.temp_profile {
            remove_profile(dir);
        }
    }

    /// Persistent profile, or a fresh throw-away one when reuse is off
    fn prepare_profile(&self) -> AppResult<(PathBuf, Option<PathBuf>)> {
        let (dir, temporary) = if self.config.use_existing_session {
            (self.config.resolved_profile_dir(), false)
        } else {
            let dir = std::env::temp_dir().join(format!(
                "decision_submit-{}-{}",
                std::process::id(),
                chrono::Local::now().format("%Y%m%d%H%M%S%3f")
            ));
            (dir, true)
        };

        std::fs::create_dir_all(&dir).map_err(|source| SessionError::ProfileDirectory {
            path: dir.display().to_string(),
            source,
        })?;
        let temp_profile = temporary.then(|| dir.clone());
        Ok((dir, temp_profile))
    }
}

fn remove_profile(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        warn!("cannot remove temporary profile {}: {}", dir.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::infrastructure::scripted_page::{PageAction, ScriptedPage};

    fn timeouts() -> Timeouts {
        Timeouts::immediate()
    }

    #[tokio::test]
    async fn existing_session_logs_in_without_clicking() {
        let page = ScriptedPage::new().visible(LOGGED_IN_MARKER);
        let ok = authenticate(&page, "https://portal.test", &timeouts(), &Reporter::new(8))
            .await
            .unwrap();

        assert!(ok);
        assert_eq!(
            page.actions(),
            vec![PageAction::Goto("https://portal.test".to_string())]
        );
    }

    #[tokio::test]
    async fn login_clicks_sso_button_and_succeeds() {
        let page = ScriptedPage::new()
            .visible(LOGIN_BUTTON)
            .reveal_on_click(LOGIN_BUTTON, LOGGED_IN_MARKER);
        let ok = authenticate(&page, "https://portal.test", &timeouts(), &Reporter::new(8))
            .await
            .unwrap();

        assert!(ok);
        assert!(page.clicked(LOGIN_BUTTON));
    }

    #[tokio::test]
    async fn login_times_out_to_false() {
        let page = ScriptedPage::new().visible(LOGIN_BUTTON);
        let ok = authenticate(&page, "https://portal.test", &timeouts(), &Reporter::new(8))
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn use_before_initialize_is_rejected() {
        let session = SessionManager::new(Config::default(), Reporter::new(8));
        assert!(matches!(
            session.page(),
            Err(AppError::Session(SessionError::NotInitialized))
        ));
        assert!(matches!(
            session.login().await,
            Err(AppError::Session(SessionError::NotInitialized))
        ));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut never_opened = SessionManager::new(Config::default(), Reporter::new(8));
        never_opened.close().await;
        never_opened.close().await;
        assert!(!never_opened.is_initialized());

        let page: Arc<dyn PortalPage> = Arc::new(ScriptedPage::new());
        let reporter = Reporter::new(8);
        let mut progress = reporter.subscribe_progress();
        let mut session = SessionManager::with_page(Config::default(), reporter, page);

        session.close().await;
        session.close().await;

        assert!(!session.is_initialized());
        assert!(session.page().is_err());
        assert_eq!(progress.try_recv().unwrap(), "Closing browser...");
        assert!(progress.try_recv().is_err());
    }
}
