//! Per-call cancellation and deadlines.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Cancellation scope of one operation.
///
/// Every operation takes a `&Context`. When its token is cancelled the
/// in-flight exchange is dropped and the call fails with
/// [`Error::Cancelled`]; when its deadline passes the call fails with
/// [`Error::Timeout`]. Side effects already applied by the server are not
/// rolled back.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use couchdb::{CancellationToken, Context};
///
/// let token = CancellationToken::new();
/// let ctx = Context::background()
///     .with_cancellation(token.child_token())
///     .with_timeout(Duration::from_secs(5));
/// assert!(!ctx.is_cancelled());
///
/// token.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub const fn background() -> Self {
        Self {
            token: None,
            deadline: None,
        }
    }

    /// Cancel the operation when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Fail the operation once `timeout` has elapsed from now.
    ///
    /// An earlier deadline already set is kept.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Fail the operation once `deadline` is reached.
    ///
    /// An earlier deadline already set is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
        self
    }

    /// The deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Run `operation` under this context.
    pub(crate) async fn run<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            return Err(Error::Timeout);
        }

        match (&self.token, self.deadline) {
            (None, None) => operation.await,
            (None, Some(deadline)) => tokio::time::timeout_at(deadline, operation)
                .await
                .map_err(|_| Error::Timeout)?,
            (Some(token), None) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(Error::Cancelled),
                    result = operation => result,
                }
            }
            (Some(token), Some(deadline)) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(Error::Cancelled),
                    result = tokio::time::timeout_at(deadline, operation) => {
                        result.map_err(|_| Error::Timeout)?
                    }
                }
            }
        }
    }
}
