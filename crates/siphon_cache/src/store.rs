//! Key/value store with lazy TTL expiry and LRU capacity bound.

use derive_getters::Getters;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Stored value with its expiration.
#[derive(Debug, Clone, Getters)]
pub struct TtlEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
}

impl<V> TtlEntry<V> {
    /// Check if this entry is expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Map whose entries expire on access once their TTL has elapsed.
///
/// Expired entries are dropped the next time they are looked up, and an
/// insert sweeps the whole store once per default TTL. When `max_size` is
/// reached the least recently used key is evicted.
///
/// # Example
///
/// ```
/// use siphon_cache::TtlStore;
/// use std::time::Duration;
///
/// let mut store = TtlStore::new(Duration::from_secs(60), 100);
/// store.insert("k", 42, None);
/// assert_eq!(store.get("k").map(|e| *e.value()), Some(42));
/// ```
#[derive(Debug)]
pub struct TtlStore<V> {
    entries: HashMap<String, TtlEntry<V>>,
    access_order: Vec<String>,
    default_ttl: Duration,
    max_size: usize,
    last_sweep: Instant,
}

impl<V> TtlStore<V> {
    /// Create a store with a default TTL and a capacity bound.
    pub fn new(default_ttl: Duration, max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            access_order: Vec::new(),
            default_ttl,
            max_size,
            last_sweep: Instant::now(),
        }
    }

    /// Insert or replace a value; `ttl` overrides the default.
    #[tracing::instrument(skip(self, value), fields(size = self.entries.len()))]
    pub fn insert(&mut self, key: &str, value: V, ttl: Option<Duration>) {
        if self.last_sweep.elapsed() >= self.default_ttl {
            self.cleanup_expired();
            self.last_sweep = Instant::now();
        }
        if self.entries.len() >= self.max_size && !self.entries.contains_key(key) {
            self.evict_lru();
        }

        self.touch(key);
        self.entries.insert(
            key.to_string(),
            TtlEntry {
                value,
                created_at: Instant::now(),
                ttl: ttl.unwrap_or(self.default_ttl),
            },
        );
    }

    /// Live entry for `key`, dropping it if it has expired.
    pub fn get(&mut self, key: &str) -> Option<&TtlEntry<V>> {
        if self.entries.get(key).is_some_and(TtlEntry::is_expired) {
            tracing::debug!(key, "Entry expired");
            self.remove(key);
            return None;
        }
        if self.entries.contains_key(key) {
            self.touch(key);
        }
        self.entries.get(key)
    }

    /// True if a live entry exists.
    pub fn contains(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove an entry, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
        self.entries.remove(key).map(|e| e.value)
    }

    /// Drop every expired entry.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired())
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "Cleaned up expired entries");
        }
        expired.len()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
        self.access_order.push(key.to_string());
    }

    fn evict_lru(&mut self) {
        if self.access_order.is_empty() {
            return;
        }
        let oldest = self.access_order.remove(0);
        tracing::debug!(key = %oldest, "Evicting least recently used entry");
        self.entries.remove(&oldest);
    }
}
