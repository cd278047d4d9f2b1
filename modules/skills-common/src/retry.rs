use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Default attempt budget for extract-style skills.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Fixed pause between attempts. No backoff growth, no jitter.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Extraction fidelity. `Advanced` is slower but handles JS-heavy pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Basic,
    Advanced,
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Basic => write!(f, "basic"),
            Depth::Advanced => write!(f, "advanced"),
        }
    }
}

/// One request/response cycle within a retry sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchAttempt {
    /// 1-based.
    pub number: u32,
    pub depth: Depth,
}

/// Every attempt failed. Carries the last error seen.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed after {} attempts: {:#}",
            self.attempts, self.last_error
        )
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryExhausted<E> {}

/// Fixed-budget retry with a single escalation step: a `Basic` request
/// switches to `Advanced` once the zero-based attempt index passes
/// `max_attempts / 2`. With five attempts, 1-3 run basic and 4-5 advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Depth to use for the given 1-based attempt.
    pub fn depth_for(&self, attempt: u32, requested: Depth) -> Depth {
        match requested {
            Depth::Basic if attempt.saturating_sub(1) > self.max_attempts / 2 => Depth::Advanced,
            other => other,
        }
    }

    /// Run `op` until it succeeds or the budget is spent.
    pub async fn run<T, E, F, Fut>(&self, requested: Depth, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(FetchAttempt) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut number = 1;
        loop {
            let attempt = FetchAttempt {
                number,
                depth: self.depth_for(number, requested),
            };

            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(
                        attempt = number,
                        max_attempts = self.max_attempts,
                        depth = %attempt.depth,
                        error = %format!("{err:#}"),
                        "Attempt failed"
                    );
                    if number >= self.max_attempts {
                        return Err(RetryExhausted {
                            attempts: number,
                            last_error: err,
                        });
                    }
                }
            }

            number += 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
    }
}
