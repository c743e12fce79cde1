//! Token-bucket rate limiting
//!
//! Buckets refill continuously: every check adds
//! `elapsed_minutes * tokens_per_minute` tokens (capped at capacity), so the
//! available balance is a real number rather than a count of whole refill
//! intervals. A check either consumes one token or reports how long the
//! caller has to wait before one becomes available. Nothing is queued.
//!
//! [`KeyedRateLimiter`] keeps one lazily created bucket per key (for example
//! per API credential) and drops buckets that have been idle for too long.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use super::{Clock, SystemClock};

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Returned when a bucket has less than one token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Rate limit exceeded, retry after {retry_after:?}")]
pub struct RateLimited {
    /// Time until one token is available again
    pub retry_after: Duration,
}

/// A single continuous-refill bucket.
///
/// The bucket does not own a clock; callers pass `now` so many buckets can
/// share one [`Clock`].
#[derive(Debug, Clone)]
pub struct TokenBucket {
    tokens: f64,
    capacity: f64,
    tokens_per_minute: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// A full bucket whose capacity equals its refill rate
    pub fn full(tokens_per_minute: u32, now: Instant) -> Self {
        let rate = f64::from(tokens_per_minute.max(1));
        Self { tokens: rate, capacity: rate, tokens_per_minute: rate, last_refill: now }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed_ms = now.saturating_duration_since(self.last_refill).as_millis() as f64;
        let refill = elapsed_ms * self.tokens_per_minute / MILLIS_PER_MINUTE;
        self.tokens = (self.tokens + refill).min(self.capacity);
        self.last_refill = now;
    }

    /// Refill, then consume one token or report the wait
    pub fn try_acquire(&mut self, now: Instant) -> Result<(), RateLimited> {
        self.refill(now);

        if self.tokens < 1.0 {
            let wait_ms = ((1.0 - self.tokens) * MILLIS_PER_MINUTE / self.tokens_per_minute).ceil();
            return Err(RateLimited { retry_after: Duration::from_millis(wait_ms.max(0.0) as u64) });
        }

        self.tokens -= 1.0;
        Ok(())
    }

    /// Tokens currently available, refilled up to `now`
    pub fn available(&mut self, now: Instant) -> f64 {
        self.refill(now);
        self.tokens
    }

    /// Time of the last refill
    pub fn last_refill(&self) -> Instant {
        self.last_refill
    }
}

/// One token bucket per key, created on first use.
///
/// Idle buckets are removed by [`KeyedRateLimiter::sweep_idle`], which also
/// runs opportunistically from [`KeyedRateLimiter::check`] at most once per
/// idle period.
pub struct KeyedRateLimiter<C: Clock = SystemClock> {
    tokens_per_minute: u32,
    idle_after: Duration,
    state: Mutex<LimiterState>,
    clock: C,
}

struct LimiterState {
    buckets: HashMap<String, TokenBucket>,
    last_sweep: Instant,
}

impl KeyedRateLimiter<SystemClock> {
    pub fn new(tokens_per_minute: u32, idle_after: Duration) -> Self {
        Self::with_clock(tokens_per_minute, idle_after, SystemClock)
    }
}

impl<C: Clock> KeyedRateLimiter<C> {
    pub fn with_clock(tokens_per_minute: u32, idle_after: Duration, clock: C) -> Self {
        let now = clock.now();
        Self {
            tokens_per_minute,
            idle_after,
            state: Mutex::new(LimiterState { buckets: HashMap::new(), last_sweep: now }),
            clock,
        }
    }

    /// Consume one token from `key`'s bucket
    pub fn check(&self, key: &str) -> Result<(), RateLimited> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        if now.saturating_duration_since(state.last_sweep) >= self.idle_after {
            let removed = Self::sweep_locked(&mut state, now, self.idle_after);
            if removed > 0 {
                debug!(removed, "Dropped idle rate limit buckets");
            }
        }

        let rate = self.tokens_per_minute;
        let bucket =
            state.buckets.entry(key.to_string()).or_insert_with(|| TokenBucket::full(rate, now));

        let outcome = bucket.try_acquire(now);
        if let Err(limited) = &outcome {
            debug!(retry_after_ms = limited.retry_after.as_millis() as u64, "Rate limit hit");
        }
        outcome
    }

    /// Remove buckets whose last refill is older than `max_idle`
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Self::sweep_locked(&mut state, now, max_idle)
    }

    fn sweep_locked(state: &mut LimiterState, now: Instant, max_idle: Duration) -> usize {
        let before = state.buckets.len();
        state
            .buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill()) <= max_idle);
        state.last_sweep = now;
        before - state.buckets.len()
    }

    /// Number of tracked keys
    pub fn tracked_keys(&self) -> usize {
        self.state.lock().buckets.len()
    }

    /// Tokens currently available for `key`; unknown keys report a full bucket
    pub fn available(&self, key: &str) -> f64 {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state
            .buckets
            .get_mut(key)
            .map_or(f64::from(self.tokens_per_minute.max(1)), |bucket| bucket.available(now))
    }
}
