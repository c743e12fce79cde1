//! Generic building blocks shared across deploywatch crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `runtime`: clock abstraction, retry executor, token-bucket rate
//!   limiting and the TTL/LRU cache with its background sweeper

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::{Cache, CacheConfig};
#[cfg(feature = "runtime")]
pub use resilience::{
    BackoffStrategy, Clock, Jitter, KeyedRateLimiter, MockClock, RateLimited, RetryConfig,
    RetryConfigBuilder, RetryDecision, RetryError, RetryExecutor, RetryPolicy, RetryResult,
    SystemClock, TokenBucket,
};
