//! One-shot eviction timers keyed by cache key.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::AbortHandle;

#[derive(Debug)]
struct Job {
    id: u64,
    handle: AbortHandle,
}

/// Runs a deferred action per key, cancelable until it fires.
///
/// Each job is a tokio task sleeping until its deadline. A job removes its
/// own registration just before its action runs, so [`has_job`] only sees
/// jobs that are still pending.
///
/// [`has_job`]: EvictionScheduler::has_job
#[derive(Debug, Default)]
pub struct EvictionScheduler {
    jobs: Arc<Mutex<HashMap<String, Job>>>,
    next_id: AtomicU64,
}

impl EvictionScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` after `delay`, replacing any pending job for `key`.
    ///
    /// Must be called from within a tokio runtime.
    #[tracing::instrument(skip(self, action))]
    pub fn schedule<F>(&self, key: &str, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let jobs = Arc::clone(&self.jobs);
        let job_key = key.to_string();

        // Hold the registry while spawning so a zero-delay job cannot fire
        // before it is registered.
        let mut registered = self.jobs.lock();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut jobs = jobs.lock();
                if jobs.get(&job_key).is_some_and(|job| job.id == id) {
                    jobs.remove(&job_key);
                }
            }
            tracing::debug!(key = %job_key, "Eviction job fired");
            action.await;
        });

        let previous = registered.insert(
            key.to_string(),
            Job {
                id,
                handle: task.abort_handle(),
            },
        );
        drop(registered);
        if let Some(previous) = previous {
            previous.handle.abort();
        }
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Eviction job scheduled");
    }

    /// True while a job for `key` is pending.
    pub fn has_job(&self, key: &str) -> bool {
        self.jobs.lock().contains_key(key)
    }

    /// Cancel the pending job for `key`. Returns whether one existed.
    pub fn cancel(&self, key: &str) -> bool {
        match self.jobs.lock().remove(key) {
            Some(job) => {
                job.handle.abort();
                tracing::debug!(key, "Eviction job cancelled");
                true
            }
            None => false,
        }
    }

    /// Number of pending jobs.
    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Cancel every pending job and return their keys.
    pub fn shutdown(&self) -> Vec<String> {
        let drained: Vec<(String, Job)> = self.jobs.lock().drain().collect();
        for (_, job) in &drained {
            job.handle.abort();
        }
        tracing::info!(cancelled = drained.len(), "Eviction scheduler shut down");
        drained.into_iter().map(|(key, _)| key).collect()
    }
}
