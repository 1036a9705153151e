//! Siphon: resolve links into parsed, cached and delivered media.
//!
//! A reference (a URL, text containing one, or a hash token) is
//! canonicalized, parsed once by the plugin that owns it, downloaded into a
//! per-request work directory and delivered through a chat transport. Results
//! are cached with scheduled eviction that also removes their files, and
//! earlier deliveries are replayed by copying the recorded messages.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use siphon::{Engine, PluginRegistry, SiphonConfig, ChatTarget};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> siphon::SiphonResult<()> {
//!     siphon::telemetry::init_tracing()?;
//!
//!     let engine = Engine::builder()
//!         .config(SiphonConfig::load()?)
//!         .registry(PluginRegistry::builder().register(MyPlugin).build())
//!         .transport(Arc::new(MyTransport::connect().await?))
//!         .build()?;
//!
//!     let target = ChatTarget { chat_id: 42, reply_to: None };
//!     engine.handle("look: https://ex.com/v/123?utm=x", &target).await?;
//!     engine.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `siphon_core` - data model
//! - `siphon_error` - error types
//! - `siphon_interface` - plugin, transport and helper traits
//! - `siphon_cache` - single-flight markers and TTL caches
//! - `siphon_storage` - download orchestration
//! - `siphon_delivery` - delivery strategies, replay and summaries
//!
//! This crate wires them into an [`Engine`] and re-exports everything.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod canonical;
mod config;
mod engine;
mod redirect;
mod registry;
pub mod telemetry;

pub use canonical::Canonicalizer;
pub use config::SiphonConfig;
pub use engine::{Engine, EngineBuilder, Resolution};
pub use redirect::{HttpRedirectResolver, MAX_REDIRECTS};
pub use registry::{PluginRegistry, PluginRegistryBuilder};

pub use siphon_cache::{
    CacheConfig, ReferenceCache, ReplayCache, ResultCache, TaskGuard, TaskRegistry, TtlPolicy,
};
pub use siphon_core::*;
pub use siphon_delivery::{
    ButtonState, DeliveryConfig, Dispatcher, Presenter, SummaryAction, SummaryGate, collapse,
};
pub use siphon_error::*;
pub use siphon_interface::*;
pub use siphon_storage::{DownloadEvent, DownloadStream, HttpFetcher, Materializer};
