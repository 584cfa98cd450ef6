//! Session cancellation
//!
//! Cancellation is an explicit token handed to the monitor loop, so several
//! sessions can coexist in one process, each with its own sender.

use tokio::sync::watch;
use tracing::{info, warn};

/// Receiving side of a cancellation signal
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until cancellation is requested
    ///
    /// Returns immediately when it already was. Never returns if the sender
    /// is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Sending side of a cancellation signal
#[derive(Debug)]
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Request cancellation; repeated calls are harmless
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Create a cancellation channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}

/// Spawns a task that cancels on Ctrl-C (and SIGTERM on Unix)
pub fn cancel_on_signal(sender: ShutdownSender) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Received interrupt signal, stopping monitor...");
        sender.cancel();
    })
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = wait_for_ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            warn!("Failed to listen for SIGTERM: {}", e);
            wait_for_ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_token_observes_cancel() {
        let (sender, token) = shutdown_channel();
        assert!(!token.is_cancelled());

        sender.cancel();
        assert!(token.is_cancelled());

        // Already cancelled: must not block
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .expect("cancelled() should resolve");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wakes_waiter() {
        let (sender, token) = shutdown_channel();
        let waiter = tokio::spawn({
            let token = token.clone();
            async move { token.cancelled().await }
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        sender.cancel();

        waiter.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_never_cancels() {
        let (sender, token) = shutdown_channel();
        drop(sender);

        let result = tokio::time::timeout(Duration::from_secs(60), token.cancelled()).await;
        assert!(result.is_err());
        assert!(!token.is_cancelled());
    }
}
