//! Result cache with scheduled eviction.

use crate::{CacheConfig, EvictionScheduler, TtlPolicy};
use async_trait::async_trait;
use parking_lot::Mutex;
use siphon_core::CacheEntry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Cleanup performed when a cached value leaves the cache.
#[async_trait]
pub trait Evict: Clone + Send + Sync + 'static {
    /// Release whatever the value owns outside memory.
    async fn evict(&self);
}

#[async_trait]
impl Evict for CacheEntry {
    async fn evict(&self) {
        if let Err(e) = self.release().await {
            tracing::warn!(error = %e, "Failed to delete downloaded files of evicted entry");
        }
    }
}

/// Cache whose entries are removed by a one-shot timer.
///
/// Every eviction, scheduled or immediate, removes the entry and then calls
/// [`Evict::evict`] on it, so a [`CacheEntry`]'s downloaded files go with it.
/// A TTL of zero disables the cache: nothing is stored or scheduled.
///
/// # Example
///
/// ```
/// use siphon_cache::{CacheConfig, ResultCache};
/// use siphon_core::{CacheEntry, ParseResult};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = ResultCache::new(&CacheConfig::default());
/// cache.set("0123456789abcdef0123456789abcdef", CacheEntry::new(ParseResult::images("t", vec![])));
/// assert!(cache.get("0123456789abcdef0123456789abcdef").is_some());
/// cache.shutdown().await;
/// # }
/// ```
#[derive(Debug)]
pub struct ResultCache<V> {
    entries: Arc<Mutex<HashMap<String, V>>>,
    scheduler: EvictionScheduler,
    ttl: Duration,
    policy: TtlPolicy,
}

impl<V: Evict> ResultCache<V> {
    /// Create a cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_ttl(config.ttl(), *config.policy())
    }

    /// Create a cache with an explicit TTL and policy.
    pub fn with_ttl(ttl: Duration, policy: TtlPolicy) -> Self {
        tracing::debug!(ttl_secs = ttl.as_secs(), %policy, "Creating ResultCache");
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            scheduler: EvictionScheduler::new(),
            ttl,
            policy,
        }
    }

    /// False when the TTL is zero.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value for `key`. Under the sliding policy a hit pushes the
    /// deadline back.
    pub fn get(&self, key: &str) -> Option<V> {
        let value = self.entries.lock().get(key).cloned();
        if value.is_some() && self.policy == TtlPolicy::Sliding {
            self.schedule_eviction(key);
        }
        tracing::trace!(key, hit = value.is_some(), "Result cache lookup");
        value
    }

    /// Store `value` under `key`.
    ///
    /// Under the fixed policy a key that already has a pending eviction keeps
    /// its original deadline.
    #[tracing::instrument(skip(self, value))]
    pub fn set(&self, key: &str, value: V) {
        if !self.is_enabled() {
            tracing::debug!("Cache disabled, skipping insert");
            return;
        }
        self.entries.lock().insert(key.to_string(), value);

        if self.policy == TtlPolicy::Sliding || !self.scheduler.has_job(key) {
            self.schedule_eviction(key);
        }
    }

    /// Remove `key` without running its eviction action.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.scheduler.cancel(key);
        self.entries.lock().remove(key)
    }

    /// Cancel the pending job and evict `key` immediately.
    #[tracing::instrument(skip(self))]
    pub async fn evict_now(&self, key: &str) {
        self.scheduler.cancel(key);
        let removed = self.entries.lock().remove(key);
        if let Some(value) = removed {
            tracing::debug!("Evicting entry immediately");
            value.evict().await;
        }
    }

    /// True if the key has a pending eviction job.
    pub fn is_scheduled(&self, key: &str) -> bool {
        self.scheduler.has_job(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Cancel every pending job and evict every remaining entry.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) {
        self.scheduler.shutdown();
        let drained: Vec<V> = self.entries.lock().drain().map(|(_, v)| v).collect();
        tracing::info!(entries = drained.len(), "Draining result cache");
        for value in drained {
            value.evict().await;
        }
    }

    fn schedule_eviction(&self, key: &str) {
        let entries = Arc::clone(&self.entries);
        let owned_key = key.to_string();
        self.scheduler.schedule(key, self.ttl, async move {
            let removed = entries.lock().remove(&owned_key);
            if let Some(value) = removed {
                tracing::debug!(key = %owned_key, "Evicting expired entry");
                value.evict().await;
            }
        });
    }
}
