//! Signal handling for interrupting a planning session

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Cancellation token shared between the signal task and the planner
#[derive(Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait until cancelled
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        while !*receiver.borrow_and_update() {
            if receiver.changed().await.is_err() {
                break;
            }
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancel `token` on SIGINT/SIGTERM (Ctrl+C elsewhere)
pub async fn setup_signal_handlers(token: CancellationToken) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => tracing::debug!("received SIGINT"),
            _ = sigterm.recv() => tracing::debug!("received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::debug!("received Ctrl+C");
    }

    token.cancel();
    Ok(())
}

/// Run `future` unless the token fires first
pub async fn with_cancellation<F, T>(token: &CancellationToken, future: F) -> Option<T>
where
    F: Future<Output = T>,
{
    if token.is_cancelled() {
        return None;
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        result = future => Some(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancellation_token_cancel() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancellation_token_clone() {
        let token1 = CancellationToken::new();
        let token2 = token1.clone();

        token1.cancel();

        assert!(token1.is_cancelled());
        assert!(token2.is_cancelled());
    }

    #[tokio::test]
    async fn test_with_cancellation_completes() {
        let token = CancellationToken::new();
        let result = with_cancellation(&token, async { 42 }).await;
        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn test_with_cancellation_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();

        let result = with_cancellation(&token, async { 42 }).await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_future() {
        let token = CancellationToken::new();
        let canceller = token.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = with_cancellation(&token, tokio::time::sleep(Duration::from_secs(30))).await;
        assert!(result.is_none());
    }
}
