// src/retry.rs
//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
}

impl RetryPolicy {
    pub fn exponential(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            multiplier: 2,
        }
    }

    /// Wait after the 1-based `attempt`: `initial_delay * multiplier^(attempt-1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1);
        let factor = self.multiplier.saturating_pow(exp);
        self.initial_delay.saturating_mul(factor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Ready { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

impl<T> RetryOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, RetryOutcome::Ready { .. })
    }
}

/// Call `probe(attempt)` until it yields `Some` or `max_attempts` probes have run.
/// Sleeps between probes, never after the last one.
pub async fn retry_until<T, F, Fut>(policy: &RetryPolicy, mut probe: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 1..=policy.max_attempts {
        if let Some(value) = probe(attempt).await {
            return RetryOutcome::Ready { value, attempts: attempt };
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay_after(attempt)).await;
        }
    }
    RetryOutcome::Exhausted {
        attempts: policy.max_attempts,
    }
}
