//! Cancellation and deadline propagation.

use crate::TransportError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Carries a caller's cancellation signal and deadline into a request.
///
/// Every public client operation takes a `&Context` first. Derived contexts
/// only ever tighten the deadline; a child created with [`Context::with_cancel`]
/// is canceled whenever its parent is.
///
/// ```rust,ignore
/// let ctx = Context::background().with_timeout(Duration::from_secs(2));
/// let user: User = client.json().get(&ctx, "users", "/users/7", HeaderMap::new()).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl Context {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context canceled through an existing token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            deadline: None,
            cancel: Some(token),
        }
    }

    /// Derive a context that expires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that expires at `deadline`, or earlier if the parent does.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            deadline: Some(deadline),
            cancel: self.cancel.clone(),
        }
    }

    /// Derive a cancelable context. Canceling the returned token cancels only
    /// the child.
    pub fn with_cancel(&self) -> (Self, CancellationToken) {
        let token = match &self.cancel {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let ctx = Self {
            deadline: self.deadline,
            cancel: Some(token.clone()),
        };
        (ctx, token)
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the context was canceled.
    pub fn is_canceled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<TransportError> {
        if self.is_canceled() {
            return Some(TransportError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(TransportError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Drive `fut` until it completes or the context is done, whichever
    /// comes first. The future is dropped when the context wins.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, TransportError> {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let canceled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = canceled => Err(TransportError::Canceled),
            _ = expired => Err(TransportError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}
