//! Tests for single-flight task markers.

use siphon_cache::TaskRegistry;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_marker_self_expires_after_ttl() {
    let tasks = TaskRegistry::new(Duration::from_secs(300));
    tasks.begin("https://ex.com/v/123");
    assert!(tasks.is_active("https://ex.com/v/123"));

    tokio::time::advance(Duration::from_secs(299)).await;
    assert!(tasks.is_active("https://ex.com/v/123"));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(!tasks.is_active("https://ex.com/v/123"));
    assert!(tasks.try_begin("https://ex.com/v/123"));
}

#[tokio::test(start_paused = true)]
async fn test_acquire_waits_for_abandoned_marker() {
    let tasks = Arc::new(TaskRegistry::new(Duration::from_secs(300)));
    tasks.begin("key");

    let started = tokio::time::Instant::now();
    let guard = tasks.acquire("key", Duration::from_secs(1)).await;

    assert!(started.elapsed() >= Duration::from_secs(300));
    assert_eq!(guard.key(), "key");
    assert!(tasks.is_active("key"));
}

#[tokio::test(start_paused = true)]
async fn test_acquire_proceeds_when_owner_finishes() {
    let tasks = Arc::new(TaskRegistry::default());
    let first = tasks.acquire("key", Duration::from_secs(1)).await;

    let waiter = {
        let tasks = Arc::clone(&tasks);
        tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            let _guard = tasks.acquire("key", Duration::from_secs(1)).await;
            started.elapsed()
        })
    };

    tokio::time::sleep(Duration::from_secs(3)).await;
    first.release();

    let waited = waiter.await.expect("Waiter task panicked");
    assert!(waited >= Duration::from_secs(3));
    assert!(waited < Duration::from_secs(10));
    assert!(!tasks.is_active("key"));
}

#[tokio::test]
async fn test_guard_drop_clears_marker() {
    let tasks = Arc::new(TaskRegistry::default());
    {
        let _guard = tasks.acquire("key", Duration::from_millis(10)).await;
        assert!(tasks.is_active("key"));
    }
    assert!(!tasks.is_active("key"));
}

#[tokio::test(start_paused = true)]
async fn test_expired_guard_leaves_newer_marker() {
    let tasks = Arc::new(TaskRegistry::new(Duration::from_secs(300)));
    let first = tasks.acquire("key", Duration::from_secs(1)).await;

    tokio::time::advance(Duration::from_secs(301)).await;
    let second = tasks.acquire("key", Duration::from_secs(1)).await;

    drop(first);
    assert!(tasks.is_active("key"));
    assert!(!tasks.try_begin("key"));

    second.release();
    assert!(!tasks.is_active("key"));
}
