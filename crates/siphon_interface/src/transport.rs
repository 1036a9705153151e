//! Delivery-side capabilities.

use async_trait::async_trait;
use siphon_core::{
    ButtonSpec, CacheEntry, CallbackTarget, ChatTarget, InlineQuery, MediaKind, MediaLocation,
    MediaRef, MessagePointer,
};
use siphon_error::SiphonResult;
use std::path::{Path, PathBuf};

/// A media item ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMedia {
    /// How the item renders
    pub kind: MediaKind,
    /// File or URL to upload
    pub location: MediaLocation,
    /// Caption attached to the item
    pub caption: Option<String>,
    /// Thumbnail locator
    pub thumbnail: Option<String>,
    /// Width in pixels
    pub width: Option<u32>,
    /// Height in pixels
    pub height: Option<u32>,
    /// Duration in seconds
    pub duration: Option<u32>,
}

impl OutgoingMedia {
    /// Bare item without caption or metadata.
    pub fn new(kind: MediaKind, location: MediaLocation) -> Self {
        Self {
            kind,
            location,
            caption: None,
            thumbnail: None,
            width: None,
            height: None,
            duration: None,
        }
    }

    /// Item carrying a media reference's location and display metadata.
    pub fn from_media(media: &MediaRef) -> Self {
        Self {
            kind: *media.kind(),
            location: media.location().clone(),
            caption: None,
            thumbnail: media.thumbnail().clone(),
            width: *media.width(),
            height: *media.height(),
            duration: *media.duration(),
        }
    }

    /// Same item with a caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// One answer to an inline query.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineResult {
    /// Text-only article
    Article {
        /// Result id
        id: String,
        /// Title shown in the picker
        title: String,
        /// Message text
        text: String,
        /// Attached keyboard
        buttons: Option<ButtonSpec>,
    },
    /// Remote photo, video or animation
    Media {
        /// Result id
        id: String,
        /// Item kind
        kind: MediaKind,
        /// Remote URL of the item
        url: String,
        /// Thumbnail URL
        thumbnail: Option<String>,
        /// Caption text
        caption: String,
        /// Attached keyboard
        buttons: Option<ButtonSpec>,
    },
}

/// The chat transport: sends, copies and edits messages.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Send a text message.
    async fn send_text(
        &self,
        target: &ChatTarget,
        text: &str,
        buttons: Option<&ButtonSpec>,
    ) -> SiphonResult<MessagePointer>;

    /// Send a photo from a local file or a remote URL.
    async fn send_photo(
        &self,
        target: &ChatTarget,
        photo: &MediaLocation,
        caption: &str,
        buttons: Option<&ButtonSpec>,
    ) -> SiphonResult<MessagePointer>;

    /// Send a video.
    async fn send_video(
        &self,
        target: &ChatTarget,
        video: &OutgoingMedia,
        buttons: Option<&ButtonSpec>,
    ) -> SiphonResult<MessagePointer>;

    /// Send an animation.
    async fn send_animation(
        &self,
        target: &ChatTarget,
        animation: &OutgoingMedia,
        buttons: Option<&ButtonSpec>,
    ) -> SiphonResult<MessagePointer>;

    /// Send items as one album.
    async fn send_media_group(
        &self,
        target: &ChatTarget,
        items: &[OutgoingMedia],
    ) -> SiphonResult<Vec<MessagePointer>>;

    /// Copy a single message into the target chat.
    async fn copy_message(
        &self,
        target: &ChatTarget,
        source: &MessagePointer,
    ) -> SiphonResult<MessagePointer>;

    /// Copy a whole media group into the target chat.
    async fn copy_media_group(
        &self,
        target: &ChatTarget,
        source: &MessagePointer,
    ) -> SiphonResult<Vec<MessagePointer>>;

    /// Replace the text and keyboard of a callback's message.
    async fn edit_text(
        &self,
        target: &CallbackTarget,
        text: &str,
        buttons: Option<&ButtonSpec>,
    ) -> SiphonResult<()>;

    /// Answer an inline query.
    async fn answer_inline(&self, query: &InlineQuery, results: &[InlineResult])
    -> SiphonResult<()>;
}

/// Uploads an image somewhere publicly reachable.
#[async_trait]
pub trait ImageRelay: Send + Sync {
    /// Upload the file and return its public URL.
    async fn relay(&self, path: &Path) -> SiphonResult<String>;
}

/// Publishes a long-form page.
#[async_trait]
pub trait ArticlePublisher: Send + Sync {
    /// Publish `html` under `title` and return the page URL.
    async fn publish(&self, title: &str, html: &str) -> SiphonResult<String>;
}

/// Produces a summary for cached content.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize the entry's parsed (and possibly downloaded) content.
    async fn summarize(&self, entry: &CacheEntry) -> SiphonResult<String>;
}

/// Splits oversized videos into sendable parts.
#[async_trait]
pub trait VideoSplitter: Send + Sync {
    /// Split `path` into parts no larger than `max_bytes`.
    async fn split(&self, path: &Path, max_bytes: u64) -> SiphonResult<Vec<PathBuf>>;
}

/// Splitter that never splits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsplit;

#[async_trait]
impl VideoSplitter for Unsplit {
    async fn split(&self, path: &Path, _max_bytes: u64) -> SiphonResult<Vec<PathBuf>> {
        Ok(vec![path.to_path_buf()])
    }
}
