//! Per-operation deadline and cancellation.
//!
//! Every ledger and payment operation receives an `OperationContext`. The
//! operation's future is raced against the deadline and the cancellation
//! token; when either fires the future is dropped, which drops any open
//! store transaction and rolls it back.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::ledger::LedgerError;

/// Deadline and cancellation state threaded through one operation.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl OperationContext {
    /// A context that never expires and is never cancelled by itself.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token, e.g. with one owned by a request.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A context sharing this deadline whose cancellation also follows ours.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            deadline: self.deadline,
            cancel: self.cancel.child_token(),
        }
    }

    /// The deadline, if one was set.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The token cancelling this operation.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fails fast if the operation is already cancelled or past its deadline.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` or `DeadlineExceeded`.
    pub fn check(&self) -> Result<(), LedgerError> {
        if self.cancel.is_cancelled() {
            return Err(LedgerError::Cancelled);
        }
        if self.deadline.is_some_and(|at| Instant::now() >= at) {
            return Err(LedgerError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Runs `fut` until it completes, the deadline passes or the token fires.
    ///
    /// # Errors
    ///
    /// Returns the future's own error, or `Cancelled` / `DeadlineExceeded`
    /// converted into `E`. In the latter cases `fut` is dropped unfinished.
    pub async fn run<F, T, E>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<LedgerError>,
    {
        self.check().map_err(E::from)?;

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(LedgerError::Cancelled.into()),
            () = deadline => Err(LedgerError::DeadlineExceeded.into()),
            result = fut => result,
        }
    }
}
