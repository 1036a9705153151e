//! Single-flight task markers.

use crate::TtlStore;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Safety TTL of a task marker. Recovers from workers that never finish.
pub const DEFAULT_TASK_TTL: Duration = Duration::from_secs(300);

/// Short-lived markers for work in progress, one per canonical reference.
///
/// A marker that is never ended expires after its TTL, so a crashed worker
/// cannot block its key forever. The TTL is not a request deadline.
///
/// Each marker records the generation of its owner. A guard that outlived
/// its marker only clears the key while it still holds that generation.
///
/// # Example
///
/// ```
/// use siphon_cache::TaskRegistry;
///
/// let tasks = TaskRegistry::default();
/// assert!(tasks.try_begin("https://ex.com/v/1"));
/// assert!(!tasks.try_begin("https://ex.com/v/1"));
/// tasks.end("https://ex.com/v/1");
/// assert!(!tasks.is_active("https://ex.com/v/1"));
/// ```
#[derive(Debug)]
pub struct TaskRegistry {
    markers: Mutex<TtlStore<u64>>,
    generation: AtomicU64,
    ttl: Duration,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TASK_TTL)
    }
}

impl TaskRegistry {
    /// Registry whose markers live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            markers: Mutex::new(TtlStore::new(ttl, usize::MAX)),
            generation: AtomicU64::new(0),
            ttl,
        }
    }

    /// Marker lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Set or refresh the marker for `key`.
    pub fn begin(&self, key: &str) {
        tracing::debug!(key, "Task marker set");
        let generation = self.next_generation();
        self.markers.lock().insert(key, generation, None);
    }

    /// True while an unexpired marker exists.
    pub fn is_active(&self, key: &str) -> bool {
        self.markers.lock().contains(key)
    }

    /// Set the marker only if none is active. Returns whether it was set.
    pub fn try_begin(&self, key: &str) -> bool {
        self.claim(key).is_some()
    }

    /// Clear the marker for `key`, whoever owns it.
    pub fn end(&self, key: &str) {
        if self.markers.lock().remove(key).is_some() {
            tracing::debug!(key, "Task marker cleared");
        }
    }

    fn claim(&self, key: &str) -> Option<u64> {
        let mut markers = self.markers.lock();
        if markers.contains(key) {
            return None;
        }
        let generation = self.next_generation();
        markers.insert(key, generation, None);
        tracing::debug!(key, generation, "Task marker acquired");
        Some(generation)
    }

    fn end_owned(&self, key: &str, generation: u64) {
        let mut markers = self.markers.lock();
        match markers.get(key).map(|marker| *marker.value()) {
            Some(current) if current == generation => {
                markers.remove(key);
                tracing::debug!(key, generation, "Task marker cleared");
            }
            Some(current) => {
                tracing::warn!(key, generation, current, "Marker taken over after expiry, leaving it");
            }
            None => {}
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Wait until the marker can be set, polling at a fixed interval.
    ///
    /// The returned guard clears the marker when dropped.
    #[tracing::instrument(skip(self, poll))]
    pub async fn acquire(self: &Arc<Self>, key: &str, poll: Duration) -> TaskGuard {
        let mut waited = 0u32;
        let generation = loop {
            if let Some(generation) = self.claim(key) {
                break generation;
            }
            if waited == 0 {
                tracing::info!(key, "Same task already in progress, waiting");
            }
            waited += 1;
            tokio::time::sleep(poll).await;
        };
        if waited > 0 {
            tracing::debug!(key, polls = waited, "Task marker freed");
        }
        TaskGuard {
            registry: Arc::clone(self),
            key: key.to_string(),
            generation,
            released: false,
        }
    }
}

/// Ownership of a task marker. Ends the marker on drop.
#[derive(Debug)]
pub struct TaskGuard {
    registry: Arc<TaskRegistry>,
    key: String,
    generation: u64,
    released: bool,
}

impl TaskGuard {
    /// Marker key held by this guard.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// End the marker now.
    pub fn release(mut self) {
        self.end();
    }

    fn end(&mut self) {
        if !self.released {
            self.registry.end_owned(&self.key, self.generation);
            self.released = true;
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.end();
    }
}
