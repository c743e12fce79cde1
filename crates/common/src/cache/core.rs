//! Core cache implementation

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use super::config::CacheConfig;
use crate::resilience::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    last_accessed: Instant,
}

#[derive(Debug)]
struct CacheStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    entries: HashMap<K, CacheEntry<V>>,
    /// Least recently used first
    access_order: Vec<K>,
}

impl<K, V> CacheStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self { entries: HashMap::new(), access_order: Vec::new() }
    }

    fn touch(&mut self, key: &K) {
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.clone());
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.access_order.retain(|k| k != key);
        self.entries.remove(key).map(|entry| entry.value)
    }
}

/// Thread-safe cache with idle expiry and LRU eviction.
///
/// Clones share the same storage, so a clone can be handed to a background
/// sweeper while the original keeps serving lookups.
///
/// # Type Parameters
/// - `K`: Key type (must be `Eq + Hash + Clone`)
/// - `V`: Value type (must be `Clone`; use `Arc<T>` for heavy values)
/// - `C`: Clock type for time-based operations (defaults to `SystemClock`)
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    storage: Arc<Mutex<CacheStorage<K, V>>>,
    config: CacheConfig,
    clock: C,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache with the given configuration using system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self { storage: Arc::new(Mutex::new(CacheStorage::new())), config, clock }
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        self.config.ttl.is_some_and(|ttl| now.saturating_duration_since(entry.last_accessed) >= ttl)
    }

    /// Insert a value, evicting the least recently used entry if the cache
    /// is full.
    pub fn insert(&self, key: K, value: V) {
        let now = self.clock.now();
        let mut storage = self.storage.lock();
        self.insert_locked(&mut storage, key, value, now);
    }

    fn insert_locked(&self, storage: &mut CacheStorage<K, V>, key: K, value: V, now: Instant) {
        if let Some(max_size) = self.config.max_size {
            if !storage.entries.contains_key(&key) {
                while storage.entries.len() >= max_size.max(1) {
                    let Some(oldest) = storage.access_order.first().cloned() else { break };
                    storage.remove(&oldest);
                }
            }
        }

        storage.entries.insert(key.clone(), CacheEntry { value, last_accessed: now });
        storage.touch(&key);
    }

    /// Get a value and refresh its last access time.
    ///
    /// Returns `None` if the key is missing or has been idle past the TTL.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut storage = self.storage.lock();
        self.get_locked(&mut storage, key, now)
    }

    fn get_locked(&self, storage: &mut CacheStorage<K, V>, key: &K, now: Instant) -> Option<V> {
        let expired = self.is_expired(storage.entries.get(key)?, now);
        if expired {
            storage.remove(key);
            return None;
        }

        let entry = storage.entries.get_mut(key)?;
        entry.last_accessed = now;
        let value = entry.value.clone();
        storage.touch(key);
        Some(value)
    }

    /// Return the live value for `key`, creating it with `f` otherwise.
    ///
    /// The lookup and the insert happen under one lock, so concurrent
    /// callers never create two values for the same key.
    pub fn get_or_insert_with<F>(&self, key: K, f: F) -> V
    where
        F: FnOnce() -> V,
    {
        match self.try_get_or_insert_with(key, || Ok::<V, std::convert::Infallible>(f())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`Cache::get_or_insert_with`]; nothing is cached
    /// when `f` fails.
    pub fn try_get_or_insert_with<F, E>(&self, key: K, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let now = self.clock.now();
        let mut storage = self.storage.lock();

        if let Some(value) = self.get_locked(&mut storage, &key, now) {
            return Ok(value);
        }

        let value = f()?;
        self.insert_locked(&mut storage, key, value.clone(), now);
        Ok(value)
    }

    /// Remove a value from the cache
    pub fn remove(&self, key: &K) -> Option<V> {
        self.storage.lock().remove(key)
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        let mut storage = self.storage.lock();
        storage.entries.clear();
        storage.access_order.clear();
    }

    /// Current number of entries, expired ones included until swept
    pub fn len(&self) -> usize {
        self.storage.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` holds a live entry; does not refresh its access time
    pub fn contains_key(&self, key: &K) -> bool {
        let now = self.clock.now();
        let storage = self.storage.lock();
        storage.entries.get(key).is_some_and(|entry| !self.is_expired(entry, now))
    }

    /// Remove expired entries
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        if self.config.ttl.is_none() {
            return 0;
        }

        let now = self.clock.now();
        let mut storage = self.storage.lock();

        let expired: Vec<K> = storage
            .entries
            .iter()
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired {
            storage.remove(key);
        }

        expired.len()
    }
}

impl<K, V, C> Clone for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            clock: self.clock.clone(),
        }
    }
}
