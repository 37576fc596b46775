//! Bounded retry with a fixed delay.

use std::future::Future;
use std::time::Duration;

/// Fixed-delay retry policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: u32,
    /// Pause before each retry
    pub delay: Duration,
}

/// Outcome of a retried operation.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// An attempt succeeded
    Succeeded { value: T, attempts: u32 },
    /// Every attempt failed; carries the last error
    Exhausted { error: E, attempts: u32 },
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Total attempts allowed.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Run `operation` until it succeeds or attempts run out.
    ///
    /// `on_failure` sees every failed attempt (1-based) before the pause.
    pub async fn run<T, E, F, Fut>(
        &self,
        mut operation: F,
        mut on_failure: impl FnMut(u32, &E),
    ) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => {
                    return RetryOutcome::Succeeded {
                        value,
                        attempts: attempt,
                    }
                }
                Err(error) => {
                    on_failure(attempt, &error);
                    if attempt >= self.max_attempts() {
                        return RetryOutcome::Exhausted {
                            error,
                            attempts: attempt,
                        };
                    }
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
