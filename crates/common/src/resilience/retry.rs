//! Generic retry executor with capped exponential backoff and jitter
//!
//! The executor runs an async operation up to `max_attempts` times. Between
//! attempts it waits `min(backoff(n) + jitter, cap)`, where `backoff(n)` is
//! the configured strategy for the 0-indexed attempt `n` and `cap` is the
//! strategy ceiling. A [`RetryPolicy`] decides which errors are worth
//! another attempt, and a [`CancellationToken`] aborts the whole sequence,
//! including a pending backoff sleep.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Errors that end a retry sequence
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error
    #[error("All retry attempts exhausted after {attempts} tries: {last_error}")]
    AttemptsExhausted { attempts: u32, last_error: E },

    /// The policy refused to retry this error
    #[error("Operation failed with non-retryable error: {error}")]
    NonRetryable { attempts: u32, error: E },

    /// The cancellation token fired before the sequence finished
    #[error("Retry cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    /// The retry configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    /// The last operation error, if the sequence ended on one
    pub fn into_error(self) -> Option<E> {
        match self {
            Self::AttemptsExhausted { last_error, .. } => Some(last_error),
            Self::NonRetryable { error, .. } => Some(error),
            Self::Cancelled { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }

    /// Number of attempts made before the sequence ended
    pub fn attempts(&self) -> u32 {
        match self {
            Self::AttemptsExhausted { attempts, .. }
            | Self::NonRetryable { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
            Self::InvalidConfiguration { .. } => 0,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide what to do after `error` on the 0-indexed `attempt`
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the configured backoff
    Retry,
    /// Retry after a caller-provided delay
    RetryAfter(Duration),
    /// Give up
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// `initial_delay * base^attempt`, never above `max_delay`
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Deterministic delay for the 0-indexed `attempt`
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let delay = initial_delay.as_millis() as f64 * base.powi(exponent);
                let delay_ms = delay.min(max_delay.as_millis() as f64);
                Duration::from_millis(delay_ms as u64)
            }
        }
    }

    /// Upper bound for any delay produced by this strategy, jitter included
    pub fn ceiling(&self) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { max_delay, .. } => *max_delay,
        }
    }
}

/// Randomness added on top of the backoff delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Adds a uniform random delay in `[0, max)`
    Bounded { max: Duration },
}

impl Jitter {
    /// Random extra delay to add to the backoff
    pub fn sample(&self) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Bounded { max } => {
                let max_ms = max.as_millis() as u64;
                if max_ms == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Jitter added to each delay
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_secs(1),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
            jitter: Jitter::Bounded { max: Duration::from_secs(1) },
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<Infallible>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }

        if let BackoffStrategy::Exponential { base, .. } = &self.backoff {
            if *base < 1.0 {
                return Err(RetryError::InvalidConfiguration {
                    message: "exponential base must be at least 1".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Delay to wait after the failed 0-indexed `attempt`, jitter included
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.backoff.calculate_delay(attempt);
        (base + self.jitter.sample()).min(self.backoff.ceiling())
    }

    /// Upper bound for the total time spent sleeping between attempts
    pub fn max_total_delay(&self) -> Duration {
        self.backoff.ceiling().saturating_mul(self.max_attempts.saturating_sub(1))
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn no_jitter(mut self) -> Self {
        self.config.jitter = Jitter::None;
        self
    }

    pub fn bounded_jitter(mut self, max: Duration) -> Self {
        self.config.jitter = Jitter::Bounded { max };
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryError<Infallible>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Runs an operation under a [`RetryConfig`] and a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute `operation` until it succeeds, the policy stops, attempts run
    /// out, or `cancel` fires.
    ///
    /// The operation receives the 0-indexed attempt number.
    #[instrument(skip(self, cancel, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled { attempts: attempt });
            }

            debug!("Executing operation (attempt {}/{})", attempt + 1, max_attempts);

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(RetryError::Cancelled { attempts: attempt + 1 }),
                result = operation(attempt) => result,
            };

            let error = match result {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let delay = match self.policy.should_retry(&error, attempt) {
                RetryDecision::Stop => {
                    debug!("Retry policy stopped after attempt {}: {}", attempt + 1, error);
                    return Err(RetryError::NonRetryable { attempts: attempt + 1, error });
                }
                _ if attempt + 1 >= max_attempts => {
                    warn!("All {} attempts exhausted, last error: {}", max_attempts, error);
                    return Err(RetryError::AttemptsExhausted {
                        attempts: attempt + 1,
                        last_error: error,
                    });
                }
                RetryDecision::Retry => self.config.delay_for(attempt),
                RetryDecision::RetryAfter(delay) => delay,
            };

            warn!("Attempt {} failed ({}), retrying after {:?}", attempt + 1, error, delay);

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(RetryError::Cancelled { attempts: attempt + 1 }),
                () = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Retries on any error
    #[derive(Debug, Clone, Copy, Default)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retries
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Retries while the predicate returns true
    #[derive(Debug, Clone)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for backoff, jitter and the retry executor.

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::policies::{AlwaysRetry, NeverRetry, PredicateRetry};
    use super::*;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig::builder()
            .max_attempts(max_attempts)
            .fixed_backoff(Duration::from_millis(10))
            .no_jitter()
            .build()
            .unwrap()
    }

    /// Validates `BackoffStrategy::Exponential` behavior for the default
    /// request schedule.
    ///
    /// Assertions:
    /// - Confirms delays double from 1s.
    /// - Confirms delays are capped at 30s.
    #[test]
    fn test_exponential_backoff_doubles_until_cap() {
        let strategy = RetryConfig::default().backoff;

        let delays: Vec<u64> =
            (0..8).map(|n| strategy.calculate_delay(n).as_millis() as u64).collect();

        assert_eq!(delays, vec![1_000, 2_000, 4_000, 8_000, 16_000, 30_000, 30_000, 30_000]);
        assert_eq!(strategy.calculate_delay(500), Duration::from_secs(30));
    }

    /// Validates monotonic backoff up to the cap.
    ///
    /// Assertions:
    /// - Ensures each delay is >= the previous delay.
    /// - Ensures no delay exceeds the ceiling.
    #[test]
    fn test_backoff_is_monotonic_and_bounded() {
        let strategy = BackoffStrategy::Exponential {
            initial_delay: Duration::from_millis(250),
            base: 2.0,
            max_delay: Duration::from_secs(5),
        };

        let mut previous = Duration::ZERO;
        for attempt in 0..64 {
            let delay = strategy.calculate_delay(attempt);
            assert!(delay >= previous, "attempt {attempt} went backwards");
            assert!(delay <= strategy.ceiling());
            previous = delay;
        }
    }

    /// Validates jitter stays inside its window and never pushes a delay
    /// past the ceiling.
    ///
    /// Assertions:
    /// - Ensures sampled jitter is below the bound.
    /// - Ensures `delay_for` never exceeds the ceiling.
    /// - Ensures `delay_for` is at least the deterministic delay.
    #[test]
    fn test_jitter_is_bounded_and_capped() {
        let config = RetryConfig::default();

        for _ in 0..200 {
            assert!(config.jitter.sample() < Duration::from_secs(1));
        }
        for attempt in 0..10 {
            let delay = config.delay_for(attempt);
            assert!(delay <= Duration::from_secs(30));
            assert!(delay >= config.backoff.calculate_delay(attempt));
        }
    }

    /// Validates the worst-case total wait bound.
    ///
    /// Assertions:
    /// - Confirms the bound is `cap * (attempts - 1)`.
    #[test]
    fn test_max_total_delay() {
        let config = RetryConfig::default();
        assert_eq!(config.max_total_delay(), Duration::from_secs(90));
    }

    /// Validates configuration validation.
    ///
    /// Assertions:
    /// - Ensures zero attempts are rejected.
    /// - Ensures a shrinking exponential base is rejected.
    #[test]
    fn test_retry_config_validation() {
        assert!(RetryConfig::builder().max_attempts(0).build().is_err());
        assert!(RetryConfig::builder()
            .exponential_backoff(Duration::from_millis(10), 0.5, Duration::from_secs(1))
            .build()
            .is_err());
    }

    /// Validates `RetryExecutor::execute` recovering after transient failures.
    ///
    /// Assertions:
    /// - Confirms the value of the successful attempt is returned.
    /// - Confirms the operation ran three times.
    #[tokio::test(start_paused = true)]
    async fn test_executor_succeeds_after_retries() {
        let executor = RetryExecutor::new(RetryConfig::default(), AlwaysRetry);
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let result: RetryResult<u32, String> = executor
            .execute(&cancel, |attempt| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(format!("boom {attempt}"))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    /// Validates that exhaustion surfaces the last error.
    ///
    /// Assertions:
    /// - Confirms the error variant is `AttemptsExhausted`.
    /// - Confirms the carried error is from the final attempt.
    #[tokio::test(start_paused = true)]
    async fn test_executor_exhaustion_keeps_last_error() {
        let executor = RetryExecutor::new(fast_config(4), AlwaysRetry);
        let cancel = CancellationToken::new();

        let result: RetryResult<(), String> =
            executor.execute(&cancel, |attempt| async move { Err(format!("attempt {attempt}")) }).await;

        match result {
            Err(RetryError::AttemptsExhausted { attempts, last_error }) => {
                assert_eq!(attempts, 4);
                assert_eq!(last_error, "attempt 3");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    /// Validates that a stopping policy runs the operation once.
    ///
    /// Assertions:
    /// - Confirms a single call.
    /// - Confirms the error is `NonRetryable`.
    #[tokio::test]
    async fn test_executor_non_retryable_stops_immediately() {
        let executor = RetryExecutor::new(fast_config(5), NeverRetry);
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let result: RetryResult<(), &str> = executor
            .execute(&cancel, |_| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("not found")
                }
            })
            .await;

        assert!(matches!(result, Err(RetryError::NonRetryable { attempts: 1, error: "not found" })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Validates predicate policies mixing retryable and terminal errors.
    ///
    /// Assertions:
    /// - Confirms retries continue until the predicate rejects the error.
    #[tokio::test(start_paused = true)]
    async fn test_executor_with_predicate_policy() {
        let policy = PredicateRetry::new(|error: &u16, _attempt| *error >= 500);
        let executor = RetryExecutor::new(fast_config(5), policy);
        let cancel = CancellationToken::new();

        let result: RetryResult<(), u16> = executor
            .execute(&cancel, |attempt| async move { Err(if attempt == 0 { 503 } else { 404 }) })
            .await;

        assert!(matches!(result, Err(RetryError::NonRetryable { attempts: 2, error: 404 })));
    }

    /// Validates that cancellation interrupts a pending backoff sleep.
    ///
    /// Assertions:
    /// - Confirms the sequence ends with `Cancelled`.
    /// - Confirms no further attempt runs after cancellation.
    #[tokio::test(start_paused = true)]
    async fn test_executor_cancellation_during_backoff() {
        let executor = RetryExecutor::new(RetryConfig::default(), AlwaysRetry);
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });

        let result: RetryResult<(), String> = executor
            .execute(&cancel, |_| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("unavailable".to_string())
                }
            })
            .await;

        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 1 })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Validates `RetryError::into_error` and `attempts`.
    ///
    /// Assertions:
    /// - Confirms the wrapped error is returned for terminal variants.
    /// - Confirms cancellation carries no error.
    #[test]
    fn test_retry_error_accessors() {
        let exhausted: RetryError<&str> =
            RetryError::AttemptsExhausted { attempts: 4, last_error: "timeout" };
        assert_eq!(exhausted.attempts(), 4);
        assert_eq!(exhausted.into_error(), Some("timeout"));

        let cancelled: RetryError<&str> = RetryError::Cancelled { attempts: 2 };
        assert_eq!(cancelled.into_error(), None);
    }
}
