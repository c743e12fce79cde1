//! Resilience patterns for talking to flaky remote services
//!
//! This module provides **generic, reusable** building blocks:
//! - **Clock**: monotonic time abstraction with a controllable `MockClock`
//! - **Retry Logic**: exponential backoff capped at a ceiling, bounded
//!   jitter, pluggable retry policies and cooperative cancellation
//! - **Rate Limiting**: continuous-refill token buckets, optionally keyed
//!   per caller (for example per API credential)
//!
//! None of these types know about HTTP or deployment platforms; the infra
//! crate plugs its own error classification into [`RetryPolicy`].

pub mod clock;
pub mod rate_limiter;
pub mod retry;

pub use clock::{Clock, MockClock, SystemClock};
pub use rate_limiter::{KeyedRateLimiter, RateLimited, TokenBucket};
pub use retry::{
    policies, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder, RetryDecision, RetryError,
    RetryExecutor, RetryPolicy, RetryResult,
};
