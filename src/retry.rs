//! Bounded retry shared by the paging loops.
//!
//! A [`RetryPolicy`] bundles the attempt ceiling, the delay between attempts
//! and the predicate deciding which errors are worth another attempt. Events
//! are emitted into the caller's current span, so callers instrument the
//! returned future with their own span.

use std::{future::Future, time::Duration};

use tokio::time::sleep;

use crate::{Res, error::Error};

/// Delay schedule between two attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// `multiplier * 2^(n-1)` after the n-th failure, clamped to `[min, max]`.
    Exponential {
        multiplier: Duration,
        min: Duration,
        max: Duration,
    },
}

impl Backoff {
    /// Delay to wait after the `attempt`-th failure (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(d) => d,
            Backoff::Exponential {
                multiplier,
                min,
                max,
            } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                multiplier.saturating_mul(factor).clamp(min, max.max(min))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
    retryable: fn(&Error) -> bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            retryable: |_| true,
        }
    }

    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(max_attempts, Backoff::Fixed(delay))
    }

    pub fn exponential(
        max_attempts: u32,
        multiplier: Duration,
        min: Duration,
        max: Duration,
    ) -> Self {
        Self::new(
            max_attempts,
            Backoff::Exponential {
                multiplier,
                min,
                max,
            },
        )
    }

    /// Only errors accepted by `predicate` are retried; others are returned
    /// from [`RetryPolicy::run`] immediately.
    pub fn retry_if(mut self, predicate: fn(&Error) -> bool) -> Self {
        self.retryable = predicate;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Runs `attempt` until it succeeds, fails with a non-retryable error, or
    /// has failed `max_attempts` times in a row.
    ///
    /// # Errors
    ///
    /// Non-retryable errors are returned unchanged. Exhaustion is reported as
    /// [`Error::RetriesExhausted`] wrapping the last failure.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Res<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Res<T>>,
    {
        let mut failures = 0;

        loop {
            let err = match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !(self.retryable)(&err) {
                return Err(err);
            }

            failures += 1;
            if failures >= self.max_attempts {
                tracing::error!(operation, attempts = failures, error = %err, "giving up");
                return Err(Error::RetriesExhausted {
                    operation: operation.to_string(),
                    attempts: failures,
                    source: Box::new(err),
                });
            }

            let delay = self.backoff.delay(failures);
            tracing::warn!(
                operation,
                attempt = failures,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "attempt failed, retrying"
            );
            sleep(delay).await;
        }
    }
}
