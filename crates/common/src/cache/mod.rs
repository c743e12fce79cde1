//! Size-bounded cache with idle expiry and a background sweeper
//!
//! Entries expire when they have not been read or written for longer than
//! the configured TTL. When an insert would push the cache past its maximum
//! size, the least recently used entry is evicted first. Expired entries are
//! dropped lazily on access and eagerly by [`spawn_sweeper`].
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use deploywatch_common::cache::{Cache, CacheConfig};
//!
//! let cache: Cache<String, u32> =
//!     Cache::new(CacheConfig::ttl_lru(Duration::from_secs(1800), 10));
//! let value = cache.get_or_insert_with("vercel".to_string(), || 7);
//! assert_eq!(value, 7);
//! assert_eq!(cache.get(&"vercel".to_string()), Some(7));
//! ```

mod config;
mod core;
mod sweeper;

pub use core::Cache;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use sweeper::{spawn_sweeper, SweeperHandle};
