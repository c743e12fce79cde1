//! Cache configuration types

use std::time::Duration;

/// Configuration for cache behavior
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries (None = unlimited)
    pub max_size: Option<usize>,

    /// Idle time after which an entry expires (None = never)
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Idle-expiry only, unbounded size
    pub fn ttl(duration: Duration) -> Self {
        Self { max_size: None, ttl: Some(duration) }
    }

    /// LRU eviction only, no expiry
    pub fn lru(max_size: usize) -> Self {
        Self { max_size: Some(max_size), ttl: None }
    }

    /// Idle expiry plus LRU eviction
    pub fn ttl_lru(ttl: Duration, max_size: usize) -> Self {
        Self { max_size: Some(max_size), ttl: Some(ttl) }
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn max_size(mut self, size: usize) -> Self {
        self.config.max_size = Some(size);
        self
    }

    pub fn ttl(mut self, duration: Duration) -> Self {
        self.config.ttl = Some(duration);
        self
    }

    pub fn build(self) -> CacheConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let ttl = Duration::from_secs(1800);

        assert_eq!(CacheConfig::ttl(ttl), CacheConfig { max_size: None, ttl: Some(ttl) });
        assert_eq!(CacheConfig::lru(10), CacheConfig { max_size: Some(10), ttl: None });
        assert_eq!(CacheConfig::ttl_lru(ttl, 10), CacheConfig::builder().ttl(ttl).max_size(10).build());
    }
}
