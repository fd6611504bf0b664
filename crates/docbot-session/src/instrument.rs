//! Timing and retry wrappers around remote calls.

use std::future::Future;
use std::time::{Duration, Instant};

use docbot_client::Result;

/// Await `fut`, logging the operation name before and after with elapsed time.
pub async fn timed<F, T>(op: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tracing::debug!(op, "calling");
    let started = Instant::now();
    let result = fut.await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => tracing::debug!(op, elapsed_ms, "call finished"),
        Err(e) => tracing::debug!(op, elapsed_ms, error = %e, "call failed"),
    }
    result
}

/// Backoff settings for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }
}

/// Run `f` until it succeeds, fails with a non-retryable error, or the
/// policy's retries are used up.
pub async fn with_retry<F, Fut, T>(policy: RetryPolicy, op: &'static str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = policy.initial_backoff;
    let mut attempt = 0;

    loop {
        match timed(op, f()).await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() || attempt >= policy.max_retries => return Err(e),
            Err(e) => {
                attempt += 1;
                tracing::warn!(
                    op,
                    attempt,
                    max_retries = policy.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }
    }
}
