use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};

/// A live browser plus the task pumping its CDP events
pub struct BrowserProcess {
    pub browser: Browser,
    pub handler: JoinHandle<()>,
}

/// Launches a persistent browser rooted at `profile_dir` and returns its first page
pub async fn launch_browser(config: &Config, profile_dir: &Path) -> AppResult<(BrowserProcess, Page)> {
    info!("🚀 Launching browser...");
    debug!("profile dir: {}", profile_dir.display());

    let mut builder = BrowserConfig::builder()
        .user_data_dir(profile_dir)
        .args(vec![
            "--no-first-run",
            "--no-default-browser-check",
            "--disable-dev-shm-usage",
        ]);
    builder = if config.headless {
        builder.new_headless_mode().arg("--disable-gpu")
    } else {
        builder.with_head()
    };
    if let Some(executable) = &config.browser_executable {
        builder = builder.chrome_executable(executable);
    }

    let browser_config = builder.build().map_err(|message| {
        error!("invalid browser configuration: {}", message);
        AppError::Browser(BrowserError::ConfigurationFailed { message })
    })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("failed to launch browser: {}", e);
        AppError::browser_launch_failed(e)
    })?;
    debug!("browser launched");

    let handler = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // Give the browser a moment to report its initial targets
    sleep(Duration::from_millis(300)).await;

    let page = first_or_new_page(&browser).await?;
    info!("✅ Browser ready");
    Ok((BrowserProcess { browser, handler }, page))
}

/// Reuses an open tab when there is one
pub(crate) async fn first_or_new_page(browser: &Browser) -> AppResult<Page> {
    let pages = browser.pages().await?;
    debug!("{} open pages", pages.len());

    if let Some(page) = pages.into_iter().next() {
        return Ok(page);
    }
    browser.new_page("about:blank").await.map_err(|e| {
        error!("failed to create page: {}", e);
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(e),
        })
    })
}
