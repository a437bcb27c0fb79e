//! Cancellation and deadlines for in-flight requests.
//!
//! A [`Context`] is passed to every client operation. Cancelling it (through
//! the [`CancelHandle`] returned by [`Context::with_cancel`]) or letting its
//! deadline pass drops the transport future and the operation returns
//! [`ApiError::Cancelled`] or [`ApiError::DeadlineExceeded`].
//!
//! Contexts are cheap to clone; all clones observe the same cancellation.
//! A derived context is done when any of its ancestors is.

use std::sync::Arc;
use std::time::Duration;

use futures::future::select_all;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct Context {
    /// One receiver per `with_cancel` in the derivation chain.
    cancel: Vec<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels the [`Context`] it was created with, and every clone of it.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that can be cancelled through the returned handle.
    ///
    /// Cancelling the parent still cancels the derived context; the handle
    /// only reaches downward.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel.push(rx);
        (self, CancelHandle { tx: Arc::new(tx) })
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set a deadline. An earlier deadline already on the context wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current <= deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.iter().any(|rx| *rx.borrow())
    }

    /// The error this context currently stands for, if it is done.
    pub fn err(&self) -> Option<ApiError> {
        if self.is_cancelled() {
            return Some(ApiError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ApiError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    ///
    /// Never resolves for a background context.
    pub async fn done(&self) -> ApiError {
        let cancelled = async {
            if self.cancel.is_empty() {
                std::future::pending::<()>().await;
            }
            select_all(self.cancel.iter().cloned().map(|rx| Box::pin(wait_cancelled(rx)))).await;
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => ApiError::Cancelled,
            _ = expired => ApiError::DeadlineExceeded,
        }
    }
}

/// Resolves once `rx` reports cancellation.
async fn wait_cancelled(mut rx: watch::Receiver<bool>) {
    // A dropped handle can no longer cancel; wait forever then.
    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
