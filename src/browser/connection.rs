use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use crate::browser::launch::{first_or_new_page, BrowserProcess};
use crate::error::{AppError, AppResult};

/// Attaches to a browser started with `--remote-debugging-port=<port>`
pub async fn connect_to_browser(port: u16) -> AppResult<(BrowserProcess, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("Attaching to browser: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("failed to attach to browser: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("browser attached");

    let handler = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    sleep(Duration::from_millis(300)).await;

    let page = first_or_new_page(&browser).await?;
    Ok((BrowserProcess { browser, handler }, page))
}
