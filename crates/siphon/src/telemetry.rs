//! Tracing subscriber setup.

use siphon_error::{ConfigError, SiphonResult};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,siphon=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human-readable console subscriber.
///
/// Honors `RUST_LOG`. Fails if a global subscriber is already set.
pub fn init_tracing() -> SiphonResult<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install tracing subscriber: {}", e)))?;
    tracing::info!("Tracing initialized");
    Ok(())
}

/// Install a JSON-lines subscriber for log shipping.
pub fn init_tracing_json() -> SiphonResult<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install tracing subscriber: {}", e)))?;
    tracing::info!("Tracing initialized (json)");
    Ok(())
}
