//! Caching infrastructure for the siphon engine.
//!
//! - [`TaskRegistry`]: short-lived single-flight markers per canonical reference
//! - [`ResultCache`]: parsed content with one-shot scheduled eviction
//! - [`EvictionScheduler`]: cancelable per-key timers backing the result cache
//! - [`ReplayCache`], [`ReferenceCache`]: secondary lookups with lazy expiry

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod lookup;
mod result;
mod scheduler;
mod store;
mod task;

pub use config::{CacheConfig, CacheConfigBuilder, TtlPolicy};
pub use lookup::{ReferenceCache, ReplayCache};
pub use result::{Evict, ResultCache};
pub use scheduler::EvictionScheduler;
pub use store::{TtlEntry, TtlStore};
pub use task::{DEFAULT_TASK_TTL, TaskGuard, TaskRegistry};
