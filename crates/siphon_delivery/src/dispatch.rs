//! Strategy selection, replay and inline answers.

use crate::strategy::{ImageStrategy, MultimediaStrategy, Strategy, VideoStrategy};
use crate::{ButtonState, DeliveryConfig, Presenter};
use siphon_core::{
    ButtonSpec, CacheEntry, ChatTarget, ContentShape, Delivered, DeliveredMessagePointer,
    InlineQuery, MediaRef, MessagePointer, UrlHash,
};
use siphon_error::{DeliveryError, DeliveryErrorKind, SiphonError, SiphonResult};
use siphon_interface::{
    ArticlePublisher, ImageRelay, InlineResult, MessageTransport, Unsplit, VideoSplitter,
};
use std::sync::Arc;

/// Sent when every image of a large set failed to reach the image host.
pub const RELAY_FAILED_TEXT: &str = "Failed to relay images to the image host";

/// One delivery in progress.
pub(crate) struct Job<'a> {
    pub(crate) entry: &'a mut CacheEntry,
    pub(crate) key: &'a UrlHash,
    pub(crate) target: &'a ChatTarget,
}

impl Job<'_> {
    /// Media to send: the local copy when there is one.
    pub(crate) fn media(&self) -> Vec<MediaRef> {
        self.entry
            .download
            .as_ref()
            .map(|d| d.media())
            .unwrap_or(self.entry.parse.media())
            .items()
            .to_vec()
    }
}

/// Sends cache entries through a [`MessageTransport`].
///
/// The strategy is chosen by the entry's content shape. Inside a strategy
/// every failed upload is logged and replaced by a simpler representation;
/// only a failed plain-text send is returned as an error.
#[derive(Clone)]
pub struct Dispatcher {
    pub(crate) transport: Arc<dyn MessageTransport>,
    pub(crate) relay: Option<Arc<dyn ImageRelay>>,
    pub(crate) publisher: Option<Arc<dyn ArticlePublisher>>,
    pub(crate) splitter: Arc<dyn VideoSplitter>,
    pub(crate) presenter: Presenter,
    pub(crate) config: DeliveryConfig,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("relay", &self.relay.is_some())
            .field("publisher", &self.publisher.is_some())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Dispatcher without relay, publisher or splitter.
    pub fn new(transport: Arc<dyn MessageTransport>, config: DeliveryConfig) -> Self {
        Self {
            transport,
            relay: None,
            publisher: None,
            splitter: Arc::new(Unsplit),
            presenter: Presenter::new(*config.summary_enabled()),
            config,
        }
    }

    /// Image host used for large image sets.
    pub fn with_relay(mut self, relay: Arc<dyn ImageRelay>) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Page publisher used for large image sets and articles.
    pub fn with_publisher(mut self, publisher: Arc<dyn ArticlePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Splitter for oversized videos.
    pub fn with_splitter(mut self, splitter: Arc<dyn VideoSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    /// Presenter used for text and keyboards.
    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// Delivery limits.
    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Arc<dyn MessageTransport> {
        &self.transport
    }

    /// Keyboard for an entry.
    pub fn button(&self, entry: &CacheEntry, key: &UrlHash, state: ButtonState) -> Option<ButtonSpec> {
        self.presenter.button(entry, key, state)
    }

    /// Deliver an entry into a chat.
    ///
    /// May record a published article URL on the entry.
    #[tracing::instrument(skip(self, entry, key), fields(key = %key, shape = %entry.parse.shape()))]
    pub async fn chat_upload(
        &self,
        entry: &mut CacheEntry,
        key: &UrlHash,
        target: &ChatTarget,
    ) -> SiphonResult<Delivered> {
        let shape = *entry.parse.shape();
        let mut job = Job { entry, key, target };
        match shape {
            ContentShape::Video => VideoStrategy.deliver(self, &mut job).await,
            ContentShape::Image => ImageStrategy.deliver(self, &mut job).await,
            ContentShape::Multimedia => MultimediaStrategy.deliver(self, &mut job).await,
        }
    }

    /// Copy previously delivered messages into a new chat.
    ///
    /// Any failure is reported as a replay failure so the caller can purge
    /// the pointer and fall back to a full delivery.
    #[tracing::instrument(skip(self, pointer, entry, key), fields(key = %key))]
    pub async fn replay(
        &self,
        pointer: &DeliveredMessagePointer,
        entry: &CacheEntry,
        key: &UrlHash,
        target: &ChatTarget,
    ) -> SiphonResult<Delivered> {
        let replayed = match pointer {
            DeliveredMessagePointer::One(source) => self.copy(target, source).await,
            DeliveredMessagePointer::Many(sources) => self.copy_all(entry, key, target, sources).await,
        };
        replayed.map_err(|e| DeliveryError::new(DeliveryErrorKind::Replay(e.to_string())).into())
    }

    async fn copy(&self, target: &ChatTarget, source: &MessagePointer) -> SiphonResult<Delivered> {
        if source.is_group {
            let copied = self.transport.copy_media_group(target, source).await?;
            Ok(Delivered::Group(copied))
        } else {
            let copied = self.transport.copy_message(target, source).await?;
            Ok(Delivered::Message(copied))
        }
    }

    async fn copy_all(
        &self,
        entry: &CacheEntry,
        key: &UrlHash,
        target: &ChatTarget,
        sources: &[MessagePointer],
    ) -> SiphonResult<Delivered> {
        let mut sent = Vec::with_capacity(sources.len() + 1);
        for source in sources {
            sent.push(self.copy(target, source).await?);
            tokio::time::sleep(self.config.replay_pause()).await;
        }
        let buttons = self.presenter.button(entry, key, ButtonState::default());
        let text = self
            .transport
            .send_text(target, &self.presenter.caption(entry), buttons.as_ref())
            .await?;
        sent.push(Delivered::Caption(text));
        Ok(Delivered::Batch(sent))
    }

    /// Answer an inline query with the entry's remote media.
    #[tracing::instrument(skip(self, entry, key), fields(key = %key))]
    pub async fn inline_upload(
        &self,
        entry: &CacheEntry,
        key: &UrlHash,
        query: &InlineQuery,
    ) -> SiphonResult<()> {
        let caption = self.presenter.caption(entry);
        let buttons = self.presenter.button(entry, key, ButtonState::default());

        let mut results: Vec<InlineResult> = entry
            .parse
            .media()
            .items()
            .iter()
            .enumerate()
            .filter_map(|(index, media)| {
                media.url().map(|url| InlineResult::Media {
                    id: index.to_string(),
                    kind: *media.kind(),
                    url: url.to_string(),
                    thumbnail: media.thumbnail().clone(),
                    caption: caption.clone(),
                    buttons: buttons.clone(),
                })
            })
            .collect();

        if results.is_empty() {
            let title = entry.parse.title();
            results.push(InlineResult::Article {
                id: "0".to_string(),
                title: if title.is_empty() {
                    key.to_string()
                } else {
                    title.clone()
                },
                text: caption,
                buttons,
            });
        }

        tracing::debug!(results = results.len(), "Answering inline query");
        self.transport.answer_inline(query, &results).await
    }

    /// Content text with keyboard: the last step of every fallback chain.
    pub(crate) async fn send_text(&self, job: &Job<'_>) -> SiphonResult<Delivered> {
        let text = self.presenter.caption(job.entry);
        self.send_plain(job, &text).await
    }

    pub(crate) async fn send_plain(&self, job: &Job<'_>, text: &str) -> SiphonResult<Delivered> {
        let buttons = self.presenter.button(job.entry, job.key, ButtonState::default());
        self.transport
            .send_text(job.target, text, buttons.as_ref())
            .await
            .map(Delivered::Message)
            .map_err(|e| upload_failure(&e))
    }

    pub(crate) fn caption(&self, job: &Job<'_>) -> String {
        self.presenter.caption(job.entry)
    }

    pub(crate) fn buttons(&self, job: &Job<'_>) -> Option<ButtonSpec> {
        self.presenter.button(job.entry, job.key, ButtonState::default())
    }
}

fn upload_failure(error: &SiphonError) -> SiphonError {
    tracing::error!(error = %error, "Final text delivery failed");
    DeliveryError::upload(error.to_string()).into()
}
