//! Optimistic-Retry Controller
//!
//! Re-runs an operation that lost a version race. Each retry starts the
//! operation from scratch, so the next write is built from a fresh read.
//!
//! State machine per invocation:
//! ```text
//! [Start] ──→ [Attempt] ──ok──→ [Success]
//!                │
//!                ├── other error ──→ [NonConflictFailure]
//!                │
//!                └── version conflict ──→ retries left? ──yes──→ [Backoff] ──→ [Attempt]
//!                                               │
//!                                               └── no ──→ [BudgetExhausted]
//! ```

use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::cancel::until_cancelled;
use crate::domain::{BackoffJitter, RetryConfig, UniformJitter};
use crate::error::IpSetError;

/// Retries version conflicts with jittered backoff
#[derive(Clone)]
pub struct OptimisticRetry {
    /// Retries after the first attempt
    max_retries: u32,
    jitter: Arc<dyn BackoffJitter>,
}

impl Default for OptimisticRetry {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl OptimisticRetry {
    pub fn new(max_retries: u32, jitter: Arc<dyn BackoffJitter>) -> Self {
        Self {
            max_retries,
            jitter,
        }
    }

    /// Uniform jitter over the configured backoff window
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Arc::new(UniformJitter::from_config(config)),
        )
    }

    pub fn with_jitter(mut self, jitter: Arc<dyn BackoffJitter>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run `op` until it succeeds, fails with anything but a version
    /// conflict, or conflicts more than `max_retries` times
    ///
    /// Exhaustion yields [`IpSetError::RetryExhausted`] carrying the last
    /// conflict. Cancellation during the backoff sleep yields
    /// [`IpSetError::Cancelled`].
    pub async fn run<F, Fut, T>(&self, cancel: &CancellationToken, mut op: F) -> Result<T, IpSetError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, IpSetError>>,
    {
        let mut conflicts: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(IpSetError::Cancelled);
            }

            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_version_conflict() => err,
                Err(err) => return Err(err),
            };

            conflicts += 1;
            if conflicts > self.max_retries {
                warn!(
                    attempts = conflicts,
                    max_retries = self.max_retries,
                    "Version conflict retries exhausted"
                );
                return Err(exhausted(err, conflicts));
            }

            let delay = self.jitter.next_delay();
            debug!(
                attempt = conflicts,
                delay_ms = delay.as_millis() as u64,
                "Version conflict, backing off before retry"
            );
            until_cancelled(cancel, tokio::time::sleep(delay)).await?;
        }
    }
}

fn exhausted(err: IpSetError, attempts: u32) -> IpSetError {
    match err {
        IpSetError::Write(source) => IpSetError::RetryExhausted { attempts, source },
        other => other,
    }
}
