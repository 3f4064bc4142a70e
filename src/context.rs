// ============================================================================
// Cancellation Context
// ============================================================================
//
// Carries the cancellation signal and deadline a driver operation runs
// under. A transaction captures its context at begin time and reuses it,
// unmodified, for commit and rollback.
//
// ============================================================================

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::core::{DriverError, Result};

/// A cancellation token shared between the caller and in-flight operations.
///
/// Clones observe the same state.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation and wake every pending `cancelled()` wait.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token has been canceled.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            let notified = self.inner.notify.notified();
            // notify_waiters only wakes already-registered waiters; a cancel
            // landing between the check above and registration must be
            // re-checked here.
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Cancellation-aware execution context for driver operations.
///
/// Cheap to clone. A context with neither a token nor a deadline never
/// cancels.
#[derive(Clone, Default)]
pub struct Context {
    cancellation: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that never cancels and never expires.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.check().is_err()
    }

    /// Fail fast if the context is already canceled or past its deadline.
    pub fn check(&self) -> Result<()> {
        if let Some(token) = &self.cancellation {
            if token.is_cancelled() {
                return Err(DriverError::Canceled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(DriverError::DeadlineExceeded);
            }
        }
        Ok(())
    }

    /// Run a driver operation under this context.
    ///
    /// An already-canceled context returns immediately without polling the
    /// future at all. Otherwise the future races cancellation and the
    /// deadline; the losing side is dropped, so a canceled network
    /// round-trip returns promptly instead of completing.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let cancelled = async {
            match &self.cancellation {
                Some(token) => token.cancelled().await,
                None => futures::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => futures::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(DriverError::Canceled),
            _ = expired => Err(DriverError::DeadlineExceeded),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_wakes_pending_wait() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::task::yield_now().await;
        token.cancel();

        handle.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_run_passes_through_result() {
        let ctx = Context::new();
        let value = ctx.run(async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_run_does_not_poll_when_already_canceled() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = Context::new().with_cancellation(token);

        let polled = Arc::new(AtomicBool::new(false));
        let flag = polled.clone();
        let result = ctx
            .run(async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(DriverError::Canceled)));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_run_cancels_in_flight_operation() {
        let token = CancellationToken::new();
        let ctx = Context::new().with_cancellation(token.clone());

        let canceler = tokio::spawn(async move {
            tokio::task::yield_now().await;
            token.cancel();
        });

        let result: Result<()> = ctx.run(futures::future::pending()).await;
        assert!(matches!(result, Err(DriverError::Canceled)));
        canceler.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_observes_deadline() {
        let ctx = Context::new().with_timeout(Duration::from_millis(50));

        let result: Result<()> = ctx.run(futures::future::pending()).await;
        assert!(matches!(result, Err(DriverError::DeadlineExceeded)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_fails_check() {
        let ctx = Context::new().with_timeout(Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(20)).await;

        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.check(), Err(DriverError::DeadlineExceeded)));
    }
}
