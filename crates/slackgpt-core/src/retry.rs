//! Bounded immediate-retry policy for calls to external services.
//!
//! The same policy type drives both completion calls and message delivery,
//! each with its own attempt limit. There is no delay or backoff between
//! attempts; the attempt counter is local to a single [`RetryPolicy::run`].

use std::fmt;
use std::future::Future;

// ---------------------------------------------------------------------------
// RetryExhausted
// ---------------------------------------------------------------------------

/// Every attempt failed; carries the error from the final attempt.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// Number of attempts made (always equals the policy's limit).
    pub attempts: u32,
    /// The error returned by the last attempt.
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gave up after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryExhausted<E> {}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Immediate bounded retry with a fixed attempt limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Create a policy allowing `max_attempts` total attempts.
    ///
    /// A limit of 0 is raised to 1: the operation always runs at least once.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether another attempt follows a failure of `attempt` (1-based).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Run `op` until it succeeds or the attempt limit is reached.
    ///
    /// `op` receives the 1-based attempt number. Every failed attempt is
    /// logged at warn level with `operation` as a field.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        E: fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "attempt failed"
                    );
                    if !self.should_retry(attempt) {
                        return Err(RetryExhausted {
                            attempts: attempt,
                            last_error: err,
                        });
                    }
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(slackgpt_types::config::DEFAULT_COMPLETION_RETRIES)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
