//! Cancellation and deadlines for API calls.

use std::future::{pending, Future};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{transport_error, Error, TransportErrorKind};

/// Controls how long a call may run.
///
/// A call bound to a context is abandoned as soon as the context's token is
/// cancelled or its deadline passes; the pending HTTP exchange is dropped and
/// the call returns a `Canceled` or `DeadlineExceeded` transport error.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancellation: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that never cancels and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the call when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Abort the call once `timeout` has elapsed from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Abort the call at `deadline`. An earlier deadline already set wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(CancellationToken::is_cancelled)
            .unwrap_or(false)
    }

    /// Drive `fut` to completion unless the context fires first.
    pub(crate) async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Error> {
        let cancelled = async {
            match &self.cancellation {
                Some(token) => token.cancelled().await,
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(transport_error(TransportErrorKind::Canceled, "context canceled")),
            _ = expired => Err(transport_error(
                TransportErrorKind::DeadlineExceeded,
                "context deadline exceeded",
            )),
            output = fut => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_empty_context_runs_to_completion() {
        let ctx = CallContext::new();
        assert_eq!(ctx.run(async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::new().with_cancellation(token);
        assert!(ctx.is_cancelled());

        let err = ctx.run(async { 7 }).await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Transport(TransportErrorKind::Canceled)
        );
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(20));
        let err = ctx.run(pending::<()>()).await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Transport(TransportErrorKind::DeadlineExceeded)
        );
    }

    #[test]
    fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = CallContext::new()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
