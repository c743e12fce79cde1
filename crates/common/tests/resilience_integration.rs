//! Integration tests for resilience module
//!
//! Exercises the retry executor against a flaky operation and the keyed rate
//! limiter under a controlled clock.

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use deploywatch_common::resilience::{
    KeyedRateLimiter, MockClock, RetryConfig, RetryDecision, RetryError, RetryExecutor,
    RetryPolicy,
};
use tokio_util::sync::CancellationToken;

/// Error shaped like an HTTP failure
#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusError(u16);

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "status {}", self.0)
    }
}

/// Retries server errors only
struct ServerErrorsOnly;

impl RetryPolicy<StatusError> for ServerErrorsOnly {
    fn should_retry(&self, error: &StatusError, _attempt: u32) -> RetryDecision {
        if error.0 >= 500 {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

/// Validates the full default schedule against a service that keeps failing.
///
/// # Test Steps
/// 1. Run the default configuration (4 attempts, 1s base, 30s cap)
/// 2. Fail every attempt with a 503
/// 3. Verify four calls were made
/// 4. Verify the paused clock advanced no more than the worst-case bound
#[tokio::test(start_paused = true)]
async fn test_retry_schedule_stays_within_total_bound() {
    let config = RetryConfig::default();
    let bound = config.max_total_delay();
    let executor = RetryExecutor::new(config, ServerErrorsOnly);
    let calls = Arc::new(AtomicU32::new(0));
    let started = tokio::time::Instant::now();

    let result: Result<(), _> = executor
        .execute(&CancellationToken::new(), |_| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StatusError(503))
            }
        })
        .await;

    assert!(matches!(result, Err(RetryError::AttemptsExhausted { attempts: 4, .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(started.elapsed() <= bound);
    assert!(started.elapsed() >= Duration::from_secs(7));
}

/// Validates that client errors are never retried.
///
/// # Test Steps
/// 1. Fail the first attempt with a 404
/// 2. Verify exactly one call was made and the 404 is surfaced
#[tokio::test]
async fn test_client_error_is_not_retried() {
    let executor = RetryExecutor::new(RetryConfig::default(), ServerErrorsOnly);
    let calls = Arc::new(AtomicU32::new(0));

    let result: Result<(), _> = executor
        .execute(&CancellationToken::new(), |_| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StatusError(404))
            }
        })
        .await;

    assert_eq!(result.unwrap_err().into_error(), Some(StatusError(404)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Validates the per-credential budget end to end.
///
/// # Test Steps
/// 1. Exhaust a 30/minute budget for one credential
/// 2. Verify the rejection carries a non-negative retry-after
/// 3. Advance the mock clock by that amount
/// 4. Verify the next check succeeds while another credential was unaffected
#[test]
fn test_rate_limiter_recovers_after_retry_after() {
    let clock = MockClock::new();
    let limiter = KeyedRateLimiter::with_clock(30, Duration::from_secs(3_600), clock.clone());

    for _ in 0..30 {
        limiter.check("token-a").unwrap();
    }
    let limited = limiter.check("token-a").unwrap_err();
    assert!(limited.retry_after > Duration::ZERO);

    clock.advance(limited.retry_after);

    assert!(limiter.check("token-a").is_ok());
    assert!(limiter.check("token-b").is_ok());
}

/// Validates opportunistic cleanup of idle buckets during checks.
///
/// # Test Steps
/// 1. Touch two credentials
/// 2. Advance past the idle threshold
/// 3. Check a third credential
/// 4. Verify only the new bucket remains
#[test]
fn test_idle_buckets_are_swept_on_check() {
    let clock = MockClock::new();
    let limiter = KeyedRateLimiter::with_clock(30, Duration::from_secs(3_600), clock.clone());

    limiter.check("one").unwrap();
    limiter.check("two").unwrap();
    clock.advance(Duration::from_secs(3_601));
    limiter.check("three").unwrap();

    assert_eq!(limiter.tracked_keys(), 1);
}
