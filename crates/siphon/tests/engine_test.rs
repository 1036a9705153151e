//! End-to-end tests for the engine pipeline with in-memory capabilities.

mod test_utils;

use futures_util::StreamExt;
use siphon::{
    CallbackTarget, Engine, InlineQuery, MediaKind, MediaRef, ParseResult, PluginRegistry,
    SiphonConfig, SiphonErrorKind,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::TempDir;
use test_utils::{Call, MockFetcher, MockPlugin, MockRedirects, MockSummarizer, MockTransport, target};

const VIDEO_URL: &str = "https://ex.com/v/1";

fn config(dir: &TempDir) -> SiphonConfig {
    SiphonConfig::default()
        .with_download_dir(dir.path().to_path_buf())
        .with_task_poll_ms(10)
        .with_relay_retry_delay_ms(1)
}

fn engine(
    config: SiphonConfig,
    plugin: MockPlugin,
    fetcher: Arc<MockFetcher>,
    transport: Arc<MockTransport>,
) -> Engine {
    Engine::builder()
        .config(config)
        .registry(PluginRegistry::builder().register(plugin).build())
        .transport(transport)
        .fetcher(fetcher)
        .redirects(Arc::new(MockRedirects::default()))
        .build()
        .expect("Engine should build")
}

fn video_plugin() -> MockPlugin {
    MockPlugin::new("video", "ex.com").with_result(|r| {
        Ok(ParseResult::video(
            "Clip",
            MediaRef::remote(MediaKind::Video, "https://cdn.ex.com/clip.mp4"),
        )
        .with_source_url(r.as_str()))
    })
}

fn leftover_files(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn test_equivalent_references_parse_once() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let plugin = MockPlugin::new("video", "ex.com").with_delay(Duration::from_millis(50));
    let parses = plugin.parses.clone();
    let transport = Arc::new(MockTransport::new());
    let engine = engine(config(&dir), plugin, Arc::new(MockFetcher::default()), transport.clone());

    let (target_a, target_b) = (target(), target());
    let (first, second) = tokio::join!(
        engine.handle("https://ex.com/v/1?utm=x", &target_a),
        engine.handle(VIDEO_URL, &target_b),
    );
    first.expect("First request should succeed");
    second.expect("Second request should succeed");

    assert_eq!(parses.load(Ordering::SeqCst), 1);
    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], Call::Text(_)));
    assert_eq!(calls[1], Call::Copy(1));
}

#[tokio::test]
async fn test_marker_held_until_resolution_is_done() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let engine = engine(
        config(&dir),
        MockPlugin::new("video", "ex.com"),
        Arc::new(MockFetcher::default()),
        Arc::new(MockTransport::new()),
    );

    let resolution = engine.resolve(VIDEO_URL).await.expect("Resolve should succeed");
    assert!(engine.is_pending("https://ex.com/v/1?utm=y").await.expect("Canonicalize"));

    engine
        .deliver(resolution, &target())
        .await
        .expect("Delivery should succeed");
    assert!(!engine.is_pending(VIDEO_URL).await.expect("Canonicalize"));
}

#[tokio::test]
async fn test_parse_failure_releases_marker() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let transport = Arc::new(MockTransport::new());
    let engine = engine(
        config(&dir),
        MockPlugin::new("video", "ex.com").with_parse_failure(),
        Arc::new(MockFetcher::default()),
        transport.clone(),
    );

    let err = engine.handle(VIDEO_URL, &target()).await.unwrap_err();
    assert!(err.is_parse_failure());
    assert!(!engine.is_pending(VIDEO_URL).await.expect("Canonicalize"));
    assert!(engine.results().is_empty());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_download_failure_evicts_and_propagates() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let transport = Arc::new(MockTransport::new());
    let engine = engine(
        config(&dir),
        video_plugin(),
        Arc::new(MockFetcher::with_failure()),
        transport.clone(),
    );

    let err = engine.handle(VIDEO_URL, &target()).await.unwrap_err();
    assert!(err.is_download_failure());
    assert!(format!("{err}").contains("503"));
    assert!(engine.results().is_empty());
    assert!(!engine.is_pending(VIDEO_URL).await.expect("Canonicalize"));
    assert_eq!(leftover_files(&dir), 0);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_download_streams_progress_and_is_reused() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let fetcher = Arc::new(MockFetcher::with_size(20 * 1024));
    let engine = engine(
        config(&dir),
        video_plugin(),
        fetcher.clone(),
        Arc::new(MockTransport::new()),
    );

    let mut resolution = engine.resolve(VIDEO_URL).await.expect("Resolve should succeed");
    assert!(!resolution.is_cached());
    let steps: Vec<_> = engine.download(&mut resolution).collect().await;
    let last = steps
        .last()
        .expect("At least one progress event")
        .as_ref()
        .expect("Download should succeed");
    assert!(last.is_last());
    assert_eq!(last.current, 20 * 1024);
    let path = resolution
        .entry
        .valid_download()
        .and_then(|d| d.media().items()[0].path().map(|p| p.to_path_buf()))
        .expect("Download attached to entry");
    drop(resolution);

    let mut again = engine.resolve(VIDEO_URL).await.expect("Resolve should succeed");
    assert!(again.is_cached());
    engine.materialize(&mut again).await.expect("Reuse should succeed");
    assert_eq!(fetcher.calls(), 1);
    drop(again);

    engine.shutdown().await;
    assert!(!path.exists());
    assert!(engine.results().is_empty());
}

#[tokio::test]
async fn test_disabled_cache_removes_files_after_delivery() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let plugin = MockPlugin::new("gallery", "ex.com").with_result(|_| {
        Ok(ParseResult::images(
            "Pair",
            vec![
                MediaRef::remote(MediaKind::Image, "https://cdn.ex.com/a.jpg"),
                MediaRef::remote(MediaKind::Image, "https://cdn.ex.com/b.jpg"),
            ],
        ))
    });
    let parses = plugin.parses.clone();
    let transport = Arc::new(MockTransport::new());
    let engine = engine(
        config(&dir).with_cache_ttl_secs(0),
        plugin,
        Arc::new(MockFetcher::with_size(64)),
        transport.clone(),
    );

    engine.handle(VIDEO_URL, &target()).await.expect("First delivery");
    assert_eq!(leftover_files(&dir), 0);
    engine.handle(VIDEO_URL, &target()).await.expect("Second delivery");

    assert_eq!(parses.load(Ordering::SeqCst), 2);
    assert!(engine.results().is_empty());
    assert!(!transport.calls().iter().any(|c| matches!(c, Call::Copy(_))));
    assert_eq!(
        transport.calls().iter().filter(|c| **c == Call::Group(2)).count(),
        2
    );
}

#[tokio::test]
async fn test_stale_replay_falls_back_to_delivery() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let transport = Arc::new(MockTransport::with_copy_failure());
    let engine = engine(
        config(&dir),
        MockPlugin::new("video", "ex.com"),
        Arc::new(MockFetcher::default()),
        transport.clone(),
    );

    engine.handle(VIDEO_URL, &target()).await.expect("First delivery");
    engine
        .handle(VIDEO_URL, &target())
        .await
        .expect("Fallback delivery");

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| matches!(c, Call::Text(_))));
}

#[tokio::test]
async fn test_token_resolves_to_delivered_reference() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let engine = engine(
        config(&dir),
        MockPlugin::new("video", "ex.com"),
        Arc::new(MockFetcher::default()),
        Arc::new(MockTransport::new()),
    );

    let (canonical, plugin_id) = engine.canonicalize(VIDEO_URL).await.expect("Canonicalize");
    assert_eq!(plugin_id, "video");
    let token = canonical.hash().to_string();
    assert!(engine.canonicalize(&token).await.unwrap_err().is_reference_not_found());

    engine.handle(VIDEO_URL, &target()).await.expect("Delivery");
    let (found, _) = engine.canonicalize(&token).await.expect("Token should resolve");
    assert_eq!(found, canonical);
}

#[tokio::test]
async fn test_inline_answer() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let transport = Arc::new(MockTransport::new());
    let engine = engine(
        config(&dir),
        MockPlugin::new("video", "ex.com"),
        Arc::new(MockFetcher::default()),
        transport.clone(),
    );

    let resolution = engine.resolve(VIDEO_URL).await.expect("Resolve");
    engine
        .deliver_inline(resolution, &InlineQuery { query_id: "q1".into() })
        .await
        .expect("Inline answer");
    assert_eq!(transport.calls(), vec![Call::Inline(1)]);
    assert!(!engine.is_pending(VIDEO_URL).await.expect("Canonicalize"));
}

#[tokio::test]
async fn test_summary_toggle_is_memoized() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let transport = Arc::new(MockTransport::new());
    let summarizer = Arc::new(MockSummarizer::default());
    let engine = Engine::builder()
        .config(config(&dir).with_summary_enabled(true))
        .registry(PluginRegistry::builder().register(MockPlugin::new("video", "ex.com")).build())
        .transport(transport.clone())
        .fetcher(Arc::new(MockFetcher::default()))
        .redirects(Arc::new(MockRedirects::default()))
        .summarizer(summarizer.clone())
        .build()
        .expect("Engine should build");
    let callback = CallbackTarget {
        callback_id: "cb".into(),
    };

    engine.handle(VIDEO_URL, &target()).await.expect("Delivery");
    let (canonical, _) = engine.canonicalize(VIDEO_URL).await.expect("Canonicalize");
    let key = canonical.hash();

    engine
        .toggle_summary(&format!("summary_{key}"), &callback)
        .await
        .expect("Show summary");
    engine
        .toggle_summary(&format!("unsummary_{key}"), &callback)
        .await
        .expect("Hide summary");
    engine
        .toggle_summary(&format!("summary_{key}"), &callback)
        .await
        .expect("Show summary again");

    assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
    let cached = engine.results().get(key.as_str()).expect("Entry cached");
    assert_eq!(cached.summary.as_deref(), Some("In short: Post"));
    assert!(transport
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Edit(text) if text.starts_with("In short: Post"))));

    let err = engine.toggle_summary("summary_zz", &callback).await.unwrap_err();
    assert!(err.is_reference_not_found());
}

#[tokio::test]
async fn test_concurrent_summary_presses_summarize_once() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let transport = Arc::new(MockTransport::new());
    let summarizer = Arc::new(MockSummarizer::with_delay(Duration::from_millis(50)));
    let engine = Engine::builder()
        .config(config(&dir).with_summary_enabled(true))
        .registry(PluginRegistry::builder().register(MockPlugin::new("video", "ex.com")).build())
        .transport(transport.clone())
        .fetcher(Arc::new(MockFetcher::default()))
        .redirects(Arc::new(MockRedirects::default()))
        .summarizer(summarizer.clone())
        .build()
        .expect("Engine should build");
    let callback = CallbackTarget {
        callback_id: "cb".into(),
    };

    engine.handle(VIDEO_URL, &target()).await.expect("Delivery");
    let (canonical, _) = engine.canonicalize(VIDEO_URL).await.expect("Canonicalize");
    let data = format!("summary_{}", canonical.hash());

    let (first, second) = tokio::join!(
        engine.toggle_summary(&data, &callback),
        engine.toggle_summary(&data, &callback),
    );
    first.expect("First press");
    second.expect("Second press");

    assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
    let cached = engine.results().get(canonical.hash().as_str()).expect("Entry cached");
    assert_eq!(cached.summary.as_deref(), Some("In short: Post"));
}

#[tokio::test]
async fn test_summary_requires_summarizer() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let engine = engine(
        config(&dir),
        MockPlugin::new("video", "ex.com"),
        Arc::new(MockFetcher::default()),
        Arc::new(MockTransport::new()),
    );

    let err = engine
        .toggle_summary(&format!("summary_{}", "ab".repeat(16)), &CallbackTarget { callback_id: "cb".into() })
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), SiphonErrorKind::Config(_)));
}

#[test]
fn test_builder_requires_transport() {
    let err = Engine::builder()
        .fetcher(Arc::new(MockFetcher::default()))
        .redirects(Arc::new(MockRedirects::default()))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind(), SiphonErrorKind::Config(_)));
}
