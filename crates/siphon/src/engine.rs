//! The resolution pipeline: canonicalize, parse, download, deliver.

use crate::{Canonicalizer, HttpRedirectResolver, PluginRegistry, SiphonConfig};
use async_stream::stream;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use siphon_cache::{ReferenceCache, ReplayCache, ResultCache, TaskGuard, TaskRegistry};
use siphon_core::{
    CacheEntry, CallbackTarget, CanonicalReference, ChatTarget, Delivered, InlineQuery, Progress,
    UrlHash,
};
use siphon_delivery::{Dispatcher, SummaryAction, SummaryGate};
use siphon_error::{ConfigError, ResolveError, ResolveErrorKind, SiphonError, SiphonResult};
use siphon_interface::{
    ArticlePublisher, Fetcher, ImageRelay, MessageTransport, RedirectResolver, Summarizer,
    VideoSplitter,
};
use siphon_storage::{DownloadEvent, HttpFetcher, Materializer};
use std::sync::Arc;

/// A parsed reference, holding its single-flight marker.
///
/// The marker is released when the resolution is delivered, fails or is
/// dropped. Until then a concurrent request for the same reference waits.
#[derive(Debug)]
pub struct Resolution {
    canonical: CanonicalReference,
    key: UrlHash,
    plugin_id: String,
    cached: bool,
    /// Cache entry for the reference; delivery may attach files to it
    pub entry: CacheEntry,
    guard: Option<TaskGuard>,
}

impl Resolution {
    /// Canonical form of the requested reference.
    pub fn canonical(&self) -> &CanonicalReference {
        &self.canonical
    }

    /// Cache key and opaque token for the reference.
    pub fn key(&self) -> &UrlHash {
        &self.key
    }

    /// Id of the plugin that parsed the reference.
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// True when the entry came from the result cache.
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// Release the single-flight marker early.
    pub fn release(&mut self) {
        if let Some(guard) = self.guard.take() {
            guard.release();
        }
    }
}

/// Owns the registry, caches, downloader and dispatcher.
///
/// Build one per process with [`Engine::builder`] and share it behind an
/// `Arc`. Call [`Engine::shutdown`] before exit so cached downloads are
/// removed from disk.
pub struct Engine {
    config: SiphonConfig,
    canonicalizer: Canonicalizer,
    tasks: Arc<TaskRegistry>,
    results: ResultCache<CacheEntry>,
    replays: ReplayCache,
    materializer: Materializer,
    dispatcher: Dispatcher,
    summary: Option<SummaryGate>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("canonicalizer", &self.canonicalizer)
            .field("cached", &self.results.len())
            .field("summary", &self.summary.is_some())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Start building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Active configuration.
    pub fn config(&self) -> &SiphonConfig {
        &self.config
    }

    /// The result cache.
    pub fn results(&self) -> &ResultCache<CacheEntry> {
        &self.results
    }

    /// Canonical form of a reference and its plugin id.
    pub async fn canonicalize(&self, reference: &str) -> SiphonResult<(CanonicalReference, String)> {
        let (canonical, plugin) = self.canonicalizer.canonicalize(reference).await?;
        Ok((canonical, plugin.id().to_string()))
    }

    /// True while a request for the same canonical reference is in flight.
    pub async fn is_pending(&self, reference: &str) -> SiphonResult<bool> {
        let (canonical, _) = self.canonicalizer.canonicalize(reference).await?;
        Ok(self.tasks.is_active(canonical.hash().as_str()))
    }

    /// Canonicalize, wait for the single-flight marker and parse.
    ///
    /// A cached entry short-circuits the plugin. On a parse failure the
    /// entry is evicted, the marker released and the error returned as is.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, reference: &str) -> SiphonResult<Resolution> {
        let (canonical, plugin) = self.canonicalizer.canonicalize(reference).await?;
        let key = canonical.hash();
        let guard = self
            .tasks
            .acquire(key.as_str(), self.config.task_poll())
            .await;

        let cached = self.results.get(key.as_str());
        let hit = cached.is_some();
        let entry = match cached {
            Some(entry) => {
                tracing::debug!(key = %key, "Result cache hit");
                entry
            }
            None => {
                let options = self
                    .config
                    .platform(plugin.id())
                    .parse_options(self.config.parser_proxy().as_deref());
                match plugin.parse(&canonical, &options).await {
                    Ok(parse) => {
                        tracing::info!(key = %key, plugin = plugin.id(), shape = %parse.shape(), "Parsed");
                        let entry = CacheEntry::new(parse);
                        self.results.set(key.as_str(), entry.clone());
                        self.canonicalizer.remember(&canonical);
                        entry
                    }
                    Err(e) => {
                        self.abort(&key, &e).await;
                        drop(guard);
                        return Err(e);
                    }
                }
            }
        };

        Ok(Resolution {
            cached: hit,
            canonical,
            key,
            plugin_id: plugin.id().to_string(),
            entry,
            guard: Some(guard),
        })
    }

    /// Lazily download the resolution's media, yielding progress.
    ///
    /// The finished download is attached to the entry and written back to
    /// the cache. Intact files from an earlier download are reused without
    /// any transfer. A failure runs the error boundary before it is yielded.
    pub fn download<'a>(
        &'a self,
        resolution: &'a mut Resolution,
    ) -> BoxStream<'a, SiphonResult<Progress>> {
        let proxy = self
            .config
            .platform(&resolution.plugin_id)
            .downloader_proxy(self.config.downloader_proxy().as_deref());
        let mut events = self.materializer.materialize(
            &resolution.entry.parse,
            resolution.entry.download.as_ref(),
            proxy,
        );

        stream! {
            while let Some(event) = events.next().await {
                match event {
                    Ok(DownloadEvent::Progress(progress)) => yield Ok(progress),
                    Ok(DownloadEvent::Finished(result)) => {
                        resolution.entry.download = Some(result);
                        self.results.set(resolution.key.as_str(), resolution.entry.clone());
                    }
                    Err(e) => {
                        self.fail(resolution, &e).await;
                        yield Err(e);
                        return;
                    }
                }
            }
        }
        .boxed()
    }

    /// Download without observing progress.
    pub async fn materialize(&self, resolution: &mut Resolution) -> SiphonResult<()> {
        let mut progress = self.download(resolution);
        while let Some(step) = progress.next().await {
            step?;
        }
        Ok(())
    }

    /// Deliver a resolution into a chat.
    ///
    /// A recorded earlier delivery is replayed first; a stale recording is
    /// purged and the content delivered in full. With caching disabled the
    /// downloaded files are removed once delivered.
    #[tracing::instrument(skip(self, resolution), fields(key = %resolution.key))]
    pub async fn deliver(
        &self,
        mut resolution: Resolution,
        target: &ChatTarget,
    ) -> SiphonResult<Delivered> {
        let key = resolution.key.clone();

        if let Some(pointer) = self.replays.get(&key) {
            match self
                .dispatcher
                .replay(&pointer, &resolution.entry, &key, target)
                .await
            {
                Ok(delivered) => {
                    tracing::info!("Replayed earlier delivery");
                    return Ok(delivered);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Replay failed, purging recorded messages");
                    self.replays.purge(&key);
                }
            }
        }

        self.materialize(&mut resolution).await?;

        match self
            .dispatcher
            .chat_upload(&mut resolution.entry, &key, target)
            .await
        {
            Ok(delivered) => {
                if self.results.is_enabled() {
                    if let Some(pointer) = delivered.pointer() {
                        self.replays.set(&key, pointer);
                    }
                    self.results.set(key.as_str(), resolution.entry.clone());
                } else if let Err(e) = resolution.entry.release().await {
                    tracing::warn!(error = %e, "Failed to remove delivered files");
                }
                Ok(delivered)
            }
            Err(e) => {
                self.fail(&mut resolution, &e).await;
                Err(e)
            }
        }
    }

    /// Answer an inline query with the resolution's remote media.
    #[tracing::instrument(skip(self, resolution), fields(key = %resolution.key))]
    pub async fn deliver_inline(
        &self,
        mut resolution: Resolution,
        query: &InlineQuery,
    ) -> SiphonResult<()> {
        let answered = self
            .dispatcher
            .inline_upload(&resolution.entry, &resolution.key, query)
            .await;
        if let Err(e) = &answered {
            self.fail(&mut resolution, e).await;
        }
        answered
    }

    /// Resolve and deliver in one call.
    pub async fn handle(&self, reference: &str, target: &ChatTarget) -> SiphonResult<Delivered> {
        let resolution = self.resolve(reference).await?;
        self.deliver(resolution, target).await
    }

    /// Apply a summary button press.
    ///
    /// # Errors
    ///
    /// `ReferenceNotFound` when the callback data is malformed or its entry
    /// has left the cache; a configuration error when no summarizer is set.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_summary(&self, data: &str, target: &CallbackTarget) -> SiphonResult<()> {
        let Some(gate) = &self.summary else {
            return Err(ConfigError::new("No summarizer configured").into());
        };
        let not_found =
            || ResolveError::new(ResolveErrorKind::ReferenceNotFound(data.to_string()));
        let action = SummaryAction::parse(data).ok_or_else(not_found)?;
        let key = action.key().as_str();

        // One summarizer run per entry; later presses wait and reuse it.
        let _running = match &action {
            SummaryAction::Show(_) => Some(
                self.tasks
                    .acquire(&format!("summary:{}", key), self.config.task_poll())
                    .await,
            ),
            _ => None,
        };
        let mut entry = self.results.get(key).ok_or_else(not_found)?;
        let memoized = entry.summary.is_some();

        gate.toggle(&mut entry, &action, target).await?;

        if let (false, Some(summary)) = (memoized, entry.summary) {
            // Merge into the latest entry, not the copy read above.
            if let Some(mut latest) = self.results.get(key) {
                latest.summary = Some(summary);
                self.results.set(key, latest);
            }
        }
        Ok(())
    }

    /// Cancel pending evictions and evict every cached entry now.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) {
        tracing::info!(entries = self.results.len(), "Shutting down engine");
        self.results.shutdown().await;
    }

    /// Error boundary for a request without an entry yet.
    async fn abort(&self, key: &UrlHash, error: &SiphonError) {
        tracing::error!(key = %key, error = %error, "Request failed");
        self.results.evict_now(key.as_str()).await;
    }

    /// Error boundary: evict the entry, remove its files, release the marker.
    async fn fail(&self, resolution: &mut Resolution, error: &SiphonError) {
        self.abort(&resolution.key, error).await;
        if let Err(e) = resolution.entry.release().await {
            tracing::warn!(error = %e, "Failed to remove files of failed request");
        }
        resolution.release();
    }
}

/// Assembles an [`Engine`].
///
/// Only the transport and the plugins are required. The fetcher and redirect
/// resolver default to their HTTP implementations.
#[derive(Default)]
pub struct EngineBuilder {
    config: SiphonConfig,
    registry: PluginRegistry,
    transport: Option<Arc<dyn MessageTransport>>,
    fetcher: Option<Arc<dyn Fetcher>>,
    redirects: Option<Arc<dyn RedirectResolver>>,
    relay: Option<Arc<dyn ImageRelay>>,
    publisher: Option<Arc<dyn ArticlePublisher>>,
    splitter: Option<Arc<dyn VideoSplitter>>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl EngineBuilder {
    /// Engine configuration.
    pub fn config(mut self, config: SiphonConfig) -> Self {
        self.config = config;
        self
    }

    /// Plugin table.
    pub fn registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Chat transport. Required.
    pub fn transport(mut self, transport: Arc<dyn MessageTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Source of remote bytes.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Short link resolver.
    pub fn redirects(mut self, redirects: Arc<dyn RedirectResolver>) -> Self {
        self.redirects = Some(redirects);
        self
    }

    /// Image host for large image sets.
    pub fn relay(mut self, relay: Arc<dyn ImageRelay>) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Page publisher for articles.
    pub fn publisher(mut self, publisher: Arc<dyn ArticlePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Splitter for oversized videos.
    pub fn splitter(mut self, splitter: Arc<dyn VideoSplitter>) -> Self {
        self.splitter = Some(splitter);
        self
    }

    /// Summarizer behind the summary button.
    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Validate the configuration and wire the engine.
    pub fn build(self) -> SiphonResult<Engine> {
        let config = self.config;
        config.validate()?;
        let transport = self
            .transport
            .ok_or_else(|| ConfigError::new("A message transport is required"))?;

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new()?),
        };
        let redirects: Arc<dyn RedirectResolver> = match self.redirects {
            Some(redirects) => redirects,
            None => Arc::new(HttpRedirectResolver::new(config.parser_proxy().as_deref())?),
        };

        let cache_config = config.cache_config();
        let references = Arc::new(ReferenceCache::new(&cache_config));
        let canonicalizer = Canonicalizer::new(Arc::new(self.registry), references, redirects);

        let mut dispatcher = Dispatcher::new(Arc::clone(&transport), config.delivery_config());
        if let Some(relay) = self.relay {
            dispatcher = dispatcher.with_relay(relay);
        }
        if let Some(publisher) = self.publisher {
            dispatcher = dispatcher.with_publisher(publisher);
        }
        if let Some(splitter) = self.splitter {
            dispatcher = dispatcher.with_splitter(splitter);
        }

        let summary = self
            .summarizer
            .map(|summarizer| SummaryGate::new(summarizer, transport, *dispatcher.presenter()));

        let materializer = Materializer::new(fetcher, config.download_dir().clone())
            .with_min_bytes(*config.min_download_bytes());

        tracing::info!(
            cache_ttl_secs = config.cache_ttl_secs(),
            policy = %config.ttl_policy(),
            "Engine ready"
        );
        Ok(Engine {
            tasks: Arc::new(TaskRegistry::new(config.task_ttl())),
            results: ResultCache::new(&cache_config),
            replays: ReplayCache::new(&cache_config),
            canonicalizer,
            materializer,
            dispatcher,
            summary,
            config,
        })
    }
}
