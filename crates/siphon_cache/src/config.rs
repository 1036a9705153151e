//! Cache configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When a cached result's eviction deadline is set.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TtlPolicy {
    /// Deadline fixed by the first write of a key
    #[default]
    Fixed,
    /// Deadline pushed back by every write and every hit
    Sliding,
}

/// Configuration for the result cache.
///
/// # Example
///
/// ```
/// use siphon_cache::{CacheConfig, CacheConfigBuilder, TtlPolicy};
///
/// let config = CacheConfigBuilder::default()
///     .ttl_secs(60u64)
///     .policy(TtlPolicy::Sliding)
///     .build()
///     .unwrap();
/// assert!(config.is_enabled());
/// assert!(!CacheConfig::default().with_ttl_secs(0).is_enabled());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct CacheConfig {
    /// Lifetime of cached entries in seconds; 0 disables caching
    #[serde(default = "default_ttl_secs")]
    ttl_secs: u64,

    /// Fixed or sliding deadlines
    #[serde(default)]
    policy: TtlPolicy,

    /// Upper bound for the lazily expiring lookup caches
    #[serde(default = "default_max_entries")]
    max_entries: usize,
}

fn default_ttl_secs() -> u64 {
    86_400
}

fn default_max_entries() -> usize {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            policy: TtlPolicy::default(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// False when the TTL is zero.
    pub fn is_enabled(&self) -> bool {
        self.ttl_secs > 0
    }
}
