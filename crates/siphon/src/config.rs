//! Engine configuration.
//!
//! Loaded with precedence (later sources win):
//! 1. Bundled defaults (`siphon.toml` shipped with the library)
//! 2. `~/.config/siphon/siphon.toml`
//! 3. `./siphon.toml`
//! 4. `SIPHON_*` environment variables, after loading `.env`

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use siphon_cache::{CacheConfig, TtlPolicy};
use siphon_core::PlatformOverride;
use siphon_delivery::DeliveryConfig;
use siphon_error::{ConfigError, SiphonError, SiphonResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../siphon.toml");

/// Largest media group a chat transport accepts.
const MAX_BATCH_SIZE: usize = 10;

/// Top-level siphon configuration.
///
/// # Example
///
/// ```no_run
/// use siphon::SiphonConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SiphonConfig::load()?;
/// println!("Results live for {:?}", config.cache_ttl());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct SiphonConfig {
    /// Lifetime of cached results in seconds; 0 disables caching
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,

    /// Fixed or sliding eviction deadlines
    #[serde(default)]
    ttl_policy: TtlPolicy,

    /// Safety lifetime of single-flight markers in seconds
    #[serde(default = "default_task_ttl_secs")]
    task_ttl_secs: u64,

    /// Poll interval while waiting for a marker, in milliseconds
    #[serde(default = "default_task_poll_ms")]
    task_poll_ms: u64,

    /// Offer the summary button
    #[serde(default)]
    summary_enabled: bool,

    /// Parallel image relay uploads
    #[serde(default = "default_relay_concurrency")]
    relay_concurrency: usize,

    /// Attempts per image relay upload
    #[serde(default = "default_relay_attempts")]
    relay_attempts: usize,

    /// Pause between relay attempts in milliseconds
    #[serde(default = "default_relay_retry_delay_ms")]
    relay_retry_delay_ms: u64,

    /// Maximum items per media group
    #[serde(default = "default_batch_size")]
    batch_size: usize,

    /// Completed single-file downloads below this size are rejected
    #[serde(default = "default_min_download_bytes")]
    min_download_bytes: u64,

    /// Root of per-request work directories
    #[serde(default = "default_download_dir")]
    download_dir: PathBuf,

    /// Videos above this size are split before sending
    #[serde(default = "default_video_split_bytes")]
    video_split_bytes: u64,

    /// Pause between replayed messages in milliseconds
    #[serde(default = "default_replay_pause_ms")]
    replay_pause_ms: u64,

    /// Global proxy for parsing
    #[serde(default)]
    parser_proxy: Option<String>,

    /// Global proxy for downloads
    #[serde(default)]
    downloader_proxy: Option<String>,

    /// Overrides keyed by plugin id
    #[serde(default)]
    platforms: HashMap<String, PlatformOverride>,
}

fn default_cache_ttl_secs() -> u64 {
    86_400
}

fn default_task_ttl_secs() -> u64 {
    300
}

fn default_task_poll_ms() -> u64 {
    1_000
}

fn default_relay_concurrency() -> usize {
    5
}

fn default_relay_attempts() -> usize {
    2
}

fn default_relay_retry_delay_ms() -> u64 {
    2_000
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_min_download_bytes() -> u64 {
    10 * 1024
}

fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join("siphon")
}

fn default_video_split_bytes() -> u64 {
    2 * 1024 * 1024
}

fn default_replay_pause_ms() -> u64 {
    500
}

impl Default for SiphonConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            ttl_policy: TtlPolicy::default(),
            task_ttl_secs: default_task_ttl_secs(),
            task_poll_ms: default_task_poll_ms(),
            summary_enabled: false,
            relay_concurrency: default_relay_concurrency(),
            relay_attempts: default_relay_attempts(),
            relay_retry_delay_ms: default_relay_retry_delay_ms(),
            batch_size: default_batch_size(),
            min_download_bytes: default_min_download_bytes(),
            download_dir: default_download_dir(),
            video_split_bytes: default_video_split_bytes(),
            replay_pause_ms: default_replay_pause_ms(),
            parser_proxy: None,
            downloader_proxy: None,
            platforms: HashMap::new(),
        }
    }
}

impl SiphonConfig {
    /// Load configuration from every source, then validate it.
    #[instrument]
    pub fn load() -> SiphonResult<Self> {
        debug!("Loading configuration: env > current dir > home dir > bundled defaults");
        if let Err(e) = dotenvy::dotenv() {
            debug!(error = %e, "No .env file loaded");
        }

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/siphon/siphon.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::new("siphon.toml", FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("SIPHON").try_parsing(true));

        Self::finish(builder.build())
    }

    /// Load bundled defaults overridden by one file, then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> SiphonResult<Self> {
        debug!("Loading configuration from file");
        let built = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build();
        Self::finish(built)
    }

    fn finish(built: Result<Config, config::ConfigError>) -> SiphonResult<Self> {
        let config: Self = built
            .map_err(|e| {
                SiphonError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                SiphonError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> SiphonResult<()> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(ConfigError::invalid(
                "batch_size",
                format!("must be between 1 and {}, got {}", MAX_BATCH_SIZE, self.batch_size),
            )
            .into());
        }
        if self.relay_concurrency == 0 {
            return Err(ConfigError::invalid("relay_concurrency", "must be at least 1").into());
        }
        if self.relay_attempts == 0 {
            return Err(ConfigError::invalid("relay_attempts", "must be at least 1").into());
        }
        if self.task_ttl_secs == 0 {
            return Err(ConfigError::invalid("task_ttl_secs", "must be positive").into());
        }
        Ok(())
    }

    /// Result cache lifetime.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Single-flight marker lifetime.
    pub fn task_ttl(&self) -> Duration {
        Duration::from_secs(self.task_ttl_secs)
    }

    /// Marker poll interval.
    pub fn task_poll(&self) -> Duration {
        Duration::from_millis(self.task_poll_ms)
    }

    /// Settings for the result, replay and reference caches.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_ttl_secs(self.cache_ttl_secs)
            .with_policy(self.ttl_policy)
    }

    /// Settings for the dispatcher.
    pub fn delivery_config(&self) -> DeliveryConfig {
        DeliveryConfig::default()
            .with_batch_size(self.batch_size)
            .with_relay_concurrency(self.relay_concurrency)
            .with_relay_attempts(self.relay_attempts)
            .with_relay_retry_delay_ms(self.relay_retry_delay_ms)
            .with_video_split_bytes(self.video_split_bytes)
            .with_replay_pause_ms(self.replay_pause_ms)
            .with_summary_enabled(self.summary_enabled)
    }

    /// Override for a plugin, or the empty override.
    pub fn platform(&self, plugin_id: &str) -> PlatformOverride {
        self.platforms.get(plugin_id).cloned().unwrap_or_default()
    }
}
