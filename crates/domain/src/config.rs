//! Configuration structures
//!
//! Every section has serde defaults, so a config file only needs the keys it
//! wants to change. Loading and environment overrides live in the infra
//! crate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ADAPTER_CACHE_CLEANUP_SECS, ADAPTER_CACHE_TTL_SECS, BUILDING_POLL_MS,
    DEFAULT_BASE_BACKOFF_MS, DEFAULT_JITTER_MS, DEFAULT_MAX_BACKOFF_MS,
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_RETRY_ATTEMPTS, DEFAULT_USER_AGENT, DEPLOYING_POLL_MS,
    INITIALIZING_POLL_MS, MAX_ADAPTER_CACHE_SIZE, MAX_DEPLOYMENT_WATCH_ATTEMPTS,
    MAX_TOKENS_PER_MINUTE, MAX_WATCH_TIME_SECS, RATE_LIMIT_IDLE_CLEANUP_SECS, UNKNOWN_POLL_MS,
    UPLOADING_POLL_MS,
};
use crate::errors::{DeployError, Result};
use crate::types::DeploymentState;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub rate_limit: RateLimitConfig,
    pub watch: WatchConfig,
    pub cache: AdapterCacheConfig,
    pub platforms: PlatformsConfig,
}

impl Config {
    /// Reject values that would make the executor or the watch misbehave
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_ms == 0 {
            return Err(DeployError::Config("http.timeout_ms must be greater than 0".into()));
        }
        if self.http.base_backoff_ms > self.http.max_backoff_ms {
            return Err(DeployError::Config(
                "http.base_backoff_ms must not exceed http.max_backoff_ms".into(),
            ));
        }
        if self.rate_limit.tokens_per_minute == 0 {
            return Err(DeployError::Config(
                "rate_limit.tokens_per_minute must be greater than 0".into(),
            ));
        }
        if self.watch.max_attempts == 0 || self.watch.max_duration_secs == 0 {
            return Err(DeployError::Config("watch budget must be greater than 0".into()));
        }
        if self.cache.max_size == 0 {
            return Err(DeployError::Config("cache.max_size must be greater than 0".into()));
        }
        Ok(())
    }
}

/// Request executor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-attempt timeout
    pub timeout_ms: u64,
    /// Retries after the first attempt
    pub retries: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub jitter_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            retries: DEFAULT_RETRY_ATTEMPTS,
            base_backoff_ms: DEFAULT_BASE_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            jitter_ms: DEFAULT_JITTER_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Per-credential token bucket settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Bucket capacity and refill rate
    pub tokens_per_minute: u32,
    /// Buckets untouched for this long are dropped
    pub idle_cleanup_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            tokens_per_minute: MAX_TOKENS_PER_MINUTE,
            idle_cleanup_secs: RATE_LIMIT_IDLE_CLEANUP_SECS,
        }
    }
}

/// Deployment watch budget and polling cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub max_attempts: u32,
    pub max_duration_secs: u64,
    pub intervals: PollIntervals,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_DEPLOYMENT_WATCH_ATTEMPTS,
            max_duration_secs: MAX_WATCH_TIME_SECS,
            intervals: PollIntervals::default(),
        }
    }
}

impl WatchConfig {
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }
}

/// Polling interval per lifecycle state, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollIntervals {
    pub initializing_ms: u64,
    pub building_ms: u64,
    pub uploading_ms: u64,
    pub deploying_ms: u64,
    pub unknown_ms: u64,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            initializing_ms: INITIALIZING_POLL_MS,
            building_ms: BUILDING_POLL_MS,
            uploading_ms: UPLOADING_POLL_MS,
            deploying_ms: DEPLOYING_POLL_MS,
            unknown_ms: UNKNOWN_POLL_MS,
        }
    }
}

impl PollIntervals {
    /// Delay before the next poll; zero for terminal states
    pub fn for_state(&self, state: DeploymentState) -> Duration {
        let millis = match state {
            DeploymentState::Initializing => self.initializing_ms,
            DeploymentState::Building => self.building_ms,
            DeploymentState::Uploading => self.uploading_ms,
            DeploymentState::Deploying => self.deploying_ms,
            DeploymentState::Unknown => self.unknown_ms,
            DeploymentState::Ready | DeploymentState::Error | DeploymentState::Canceled => 0,
        };
        Duration::from_millis(millis)
    }
}

/// Adapter-instance cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterCacheConfig {
    pub max_size: usize,
    pub ttl_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for AdapterCacheConfig {
    fn default() -> Self {
        Self {
            max_size: MAX_ADAPTER_CACHE_SIZE,
            ttl_secs: ADAPTER_CACHE_TTL_SECS,
            cleanup_interval_secs: ADAPTER_CACHE_CLEANUP_SECS,
        }
    }
}

impl AdapterCacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// Platform API locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformsConfig {
    pub vercel_api_url: String,
    pub netlify_api_url: String,
    pub cloudflare_api_url: String,
    /// Used when a Cloudflare credential does not embed the account id
    pub cloudflare_account_id: Option<String>,
}

impl Default for PlatformsConfig {
    fn default() -> Self {
        Self {
            vercel_api_url: "https://api.vercel.com".to_string(),
            netlify_api_url: "https://api.netlify.com/api/v1".to_string(),
            cloudflare_api_url: "https://api.cloudflare.com/client/v4".to_string(),
            cloudflare_account_id: None,
        }
    }
}
