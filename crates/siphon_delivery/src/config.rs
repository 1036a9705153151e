//! Delivery tuning.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits and switches for the dispatcher.
///
/// # Example
///
/// ```
/// use siphon_delivery::DeliveryConfigBuilder;
///
/// let config = DeliveryConfigBuilder::default()
///     .relay_concurrency(3usize)
///     .summary_enabled(true)
///     .build()
///     .unwrap();
/// assert_eq!(*config.batch_size(), 10);
/// assert_eq!(*config.relay_concurrency(), 3);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct DeliveryConfig {
    /// Maximum items per media group
    #[serde(default = "default_batch_size")]
    batch_size: usize,

    /// Parallel image relay uploads
    #[serde(default = "default_relay_concurrency")]
    relay_concurrency: usize,

    /// Attempts per image relay upload
    #[serde(default = "default_relay_attempts")]
    relay_attempts: usize,

    /// Pause between relay attempts, in milliseconds
    #[serde(default = "default_relay_retry_delay_ms")]
    relay_retry_delay_ms: u64,

    /// Videos above this size are split before sending
    #[serde(default = "default_video_split_bytes")]
    video_split_bytes: u64,

    /// Pause between replayed messages, in milliseconds
    #[serde(default = "default_replay_pause_ms")]
    replay_pause_ms: u64,

    /// Offer the summary button
    #[serde(default)]
    summary_enabled: bool,
}

fn default_batch_size() -> usize {
    10
}

fn default_relay_concurrency() -> usize {
    5
}

fn default_relay_attempts() -> usize {
    2
}

fn default_relay_retry_delay_ms() -> u64 {
    2000
}

fn default_video_split_bytes() -> u64 {
    2 * 1024 * 1024
}

fn default_replay_pause_ms() -> u64 {
    500
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            relay_concurrency: default_relay_concurrency(),
            relay_attempts: default_relay_attempts(),
            relay_retry_delay_ms: default_relay_retry_delay_ms(),
            video_split_bytes: default_video_split_bytes(),
            replay_pause_ms: default_replay_pause_ms(),
            summary_enabled: false,
        }
    }
}

impl DeliveryConfig {
    /// Pause between relay attempts.
    pub fn relay_retry_delay(&self) -> Duration {
        Duration::from_millis(self.relay_retry_delay_ms)
    }

    /// Pause between replayed messages.
    pub fn replay_pause(&self) -> Duration {
        Duration::from_millis(self.replay_pause_ms)
    }
}
