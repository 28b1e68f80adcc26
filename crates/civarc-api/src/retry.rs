//! Fixed-delay retry policy shared by listing requests and asset downloads.
//!
//! Retries are scoped to one network operation. Failures the caller marks
//! as ignorable end the operation immediately, everything else is retried
//! up to `max_attempts` times with a flat delay in between.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::error::{ApiError, ApiResult};

/// How often and how patiently a single operation is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u8,
    /// Pause between two attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// A policy with at least one attempt.
    pub const fn new(max_attempts: u8, delay: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            delay,
        }
    }
}

/// Suspension between attempts. Swapped out in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// The operation succeeded.
    Done(T),
    /// The operation failed with an ignorable error; no retry was made.
    Skipped(ApiError),
    /// Every attempt failed.
    Exhausted {
        attempts: u8,
        last_error: ApiError,
    },
}

/// Run `operation` under `policy`.
///
/// `label` names the operation in log lines.
pub async fn retry<T, F, Fut>(
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    label: &str,
    is_ignorable: impl Fn(&ApiError) -> bool,
    mut operation: F,
) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let mut attempt: u8 = 0;
    loop {
        attempt = attempt.saturating_add(1);

        let err = match operation().await {
            Ok(value) => return RetryOutcome::Done(value),
            Err(e) => e,
        };

        if is_ignorable(&err) {
            return RetryOutcome::Skipped(err);
        }

        if attempt >= policy.max_attempts {
            error!(
                operation = label,
                attempts = attempt,
                error = %err,
                "Maximum retries exceeded"
            );
            return RetryOutcome::Exhausted {
                attempts: attempt,
                last_error: err,
            };
        }

        warn!(
            operation = label,
            attempt,
            max_attempts = policy.max_attempts,
            delay_secs = policy.delay.as_secs(),
            error = %err,
            "Attempt failed, waiting before retry"
        );
        sleeper.sleep(policy.delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn transient() -> ApiError {
        ApiError::Transport("connection reset".to_string())
    }

    fn status(code: u16) -> ApiError {
        ApiError::InvalidStatusCode {
            status: code,
            url: "https://civitai.com/x".to_string(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(60));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_success_on_first_attempt_never_sleeps() {
        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().never();

        let outcome = retry(RetryPolicy::default(), &sleeper, "test", |_| false, || async {
            Ok::<_, ApiError>(7)
        })
        .await;

        assert!(matches!(outcome, RetryOutcome::Done(7)));
    }

    #[tokio::test]
    async fn test_exhausts_after_three_attempts_with_two_sleeps() {
        let mut sleeper = MockSleeper::new();
        sleeper
            .expect_sleep()
            .with(eq(Duration::from_secs(60)))
            .times(2)
            .returning(|_| ());

        let mut calls = 0;
        let outcome: RetryOutcome<()> =
            retry(RetryPolicy::default(), &sleeper, "test", |_| false, || {
                calls += 1;
                async { Err(status(500)) }
            })
            .await;

        assert_eq!(calls, 3);
        assert!(matches!(
            outcome,
            RetryOutcome::Exhausted { attempts: 3, ref last_error } if last_error.status() == Some(500)
        ));
    }

    #[tokio::test]
    async fn test_ignorable_error_short_circuits() {
        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().never();

        let mut calls = 0;
        let outcome: RetryOutcome<()> = retry(
            RetryPolicy::default(),
            &sleeper,
            "test",
            |e| e.has_status_in(&[404]),
            || {
                calls += 1;
                async { Err(status(404)) }
            },
        )
        .await;

        assert_eq!(calls, 1);
        assert!(matches!(outcome, RetryOutcome::Skipped(ref e) if e.status() == Some(404)));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().times(1).returning(|_| ());

        let mut calls = 0;
        let outcome = retry(RetryPolicy::default(), &sleeper, "test", |_| false, || {
            calls += 1;
            let result = if calls == 1 { Err(transient()) } else { Ok("page") };
            async move { result }
        })
        .await;

        assert_eq!(calls, 2);
        assert!(matches!(outcome, RetryOutcome::Done("page")));
    }

    #[test]
    fn test_exhausted_outcome_keeps_last_error() {
        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().times(1).returning(|_| ());

        let mut calls = 0u16;
        let outcome: RetryOutcome<()> = tokio_test::block_on(retry(
            RetryPolicy::new(2, Duration::from_secs(1)),
            &sleeper,
            "test",
            |_| false,
            || {
                calls += 1;
                let code = 500 + calls;
                async move { Err(status(code)) }
            },
        ));

        assert!(matches!(
            outcome,
            RetryOutcome::Exhausted { attempts: 2, ref last_error } if last_error.status() == Some(502)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_waits_full_delay() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(60)).await;
        assert!(start.elapsed() >= Duration::from_secs(60));
    }
}
