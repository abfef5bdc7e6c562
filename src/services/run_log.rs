//! Run log file
//!
//! Writes a dated header, then appends every progress line with a
//! `[HH:MM:SS]` stamp until stopped or the reporter goes away.

use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::services::Reporter;

pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Truncates `path` and writes the header
    pub async fn create(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let header = format!(
            "{}\nDecision submission log - {}\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        fs::write(&path, header)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(Self { path })
    }

    /// Subscribes now and appends lines in the background.
    ///
    /// The task ends on [`RunLogTask::finish`] (after writing every line
    /// already sent) or once every `Reporter` clone is dropped.
    pub fn attach(self, reporter: &Reporter) -> RunLogTask {
        let mut lines = reporter.subscribe_progress();
        let (stop, mut stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    received = lines.recv() => match received {
                        Ok(line) => self.write(&line).await,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!("run log lagged, {} lines dropped", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = &mut stopped => {
                        loop {
                            match lines.try_recv() {
                                Ok(line) => self.write(&line).await,
                                Err(TryRecvError::Lagged(_)) => continue,
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
        });
        RunLogTask { stop, task }
    }

    async fn write(&self, line: &str) {
        if let Err(e) = self.append(line).await {
            warn!("cannot write run log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let stamped = format!("[{}] {}\n", chrono::Local::now().format("%H:%M:%S"), line);
        file.write_all(stamped.as_bytes()).await
    }
}

/// Background writer started by [`RunLog::attach`]
pub struct RunLogTask {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RunLogTask {
    /// Writes out every line sent so far, then stops the task
    pub async fn finish(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            warn!("run log task ended abnormally: {}", e);
        }
    }
}
