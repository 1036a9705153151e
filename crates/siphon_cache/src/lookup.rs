//! Secondary lookups: replay pointers and token-to-reference mapping.

use crate::{CacheConfig, TtlStore};
use parking_lot::Mutex;
use siphon_core::{CanonicalReference, DeliveredMessagePointer, UrlHash};

/// Previously delivered messages, keyed by reference hash.
#[derive(Debug)]
pub struct ReplayCache {
    store: Mutex<TtlStore<DeliveredMessagePointer>>,
    enabled: bool,
}

impl ReplayCache {
    /// Create a replay cache sharing the result cache's TTL.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            store: Mutex::new(TtlStore::new(config.ttl(), *config.max_entries())),
            enabled: config.is_enabled(),
        }
    }

    /// Recorded pointer for `key`.
    pub fn get(&self, key: &UrlHash) -> Option<DeliveredMessagePointer> {
        self.store
            .lock()
            .get(key.as_str())
            .map(|entry| entry.value().clone())
    }

    /// Record a delivery.
    pub fn set(&self, key: &UrlHash, pointer: DeliveredMessagePointer) {
        if !self.enabled {
            return;
        }
        tracing::debug!(key = %key, "Recording delivered messages");
        self.store.lock().insert(key.as_str(), pointer, None);
    }

    /// Forget a stale pointer.
    pub fn purge(&self, key: &UrlHash) {
        if self.store.lock().remove(key.as_str()).is_some() {
            tracing::debug!(key = %key, "Purged replay pointer");
        }
    }
}

/// Maps hash tokens back to the canonical reference they were made from.
#[derive(Debug)]
pub struct ReferenceCache {
    store: Mutex<TtlStore<CanonicalReference>>,
    enabled: bool,
}

impl ReferenceCache {
    /// Create a reference cache sharing the result cache's TTL.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            store: Mutex::new(TtlStore::new(config.ttl(), *config.max_entries())),
            enabled: config.is_enabled(),
        }
    }

    /// Remember the reference behind its hash.
    pub fn insert(&self, reference: &CanonicalReference) {
        if !self.enabled {
            return;
        }
        self.store
            .lock()
            .insert(reference.hash().as_str(), reference.clone(), None);
    }

    /// Reference for a hash token.
    pub fn lookup(&self, token: &UrlHash) -> Option<CanonicalReference> {
        self.store
            .lock()
            .get(token.as_str())
            .map(|entry| entry.value().clone())
    }
}
