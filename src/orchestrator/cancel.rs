use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Cooperative cancellation, checked between records
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// First interrupt from `next_interrupt` cancels `cancel`; returns `true` once a
/// second one arrives. `false` if the interrupt source fails.
pub async fn watch_interrupts<F, Fut>(cancel: CancelHandle, mut next_interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    warn!("🛑 Ctrl+C received, stopping after the current record (press again to exit now)...");
    cancel.cancel();

    if next_interrupt().await.is_err() {
        return false;
    }
    warn!("🛑 Second Ctrl+C, exiting immediately");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn first_interrupt_cancels_second_forces_exit() {
        let cancel = CancelHandle::new();
        let (tx, rx) = mpsc::unbounded_channel::<()>();
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let watcher = tokio::spawn(watch_interrupts(cancel.clone(), move || {
            let rx = rx.clone();
            async move {
                rx.lock()
                    .await
                    .recv()
                    .await
                    .ok_or_else(|| std::io::Error::other("closed"))
            }
        }));

        tx.send(()).unwrap();
        while !cancel.is_cancelled() {
            tokio::task::yield_now().await;
        }
        assert!(!watcher.is_finished());

        tx.send(()).unwrap();
        assert!(watcher.await.unwrap());
    }

    #[tokio::test]
    async fn failing_interrupt_source_never_cancels() {
        let cancel = CancelHandle::new();
        let exit = watch_interrupts(cancel.clone(), || async {
            Err(std::io::Error::other("no signal handler"))
        })
        .await;
        assert!(!exit);
        assert!(!cancel.is_cancelled());
    }
}
