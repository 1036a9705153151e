//! Test utilities for delivery tests.
//!
//! Mock transport, relay, publisher and summarizer that record every call.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use siphon_core::{
    ButtonSpec, CacheEntry, CallbackTarget, ChatTarget, InlineQuery, MediaKind, MediaLocation,
    MessagePointer,
};
use siphon_error::{DeliveryError, DeliveryErrorKind, SiphonResult};
use siphon_interface::{ArticlePublisher, ImageRelay, InlineResult, MessageTransport, OutgoingMedia, Summarizer};
use std::path::Path;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Text(String),
    Photo(MediaLocation),
    Video(Option<String>),
    Animation(Option<String>),
    Group(Vec<MediaKind>),
    Copy(i64),
    CopyGroup(i64),
    Edit(String, Option<ButtonSpec>),
    Inline(Vec<InlineResult>),
}

/// Transport that records calls and fails on request.
#[derive(Default)]
pub struct MockTransport {
    pub calls: Mutex<Vec<Call>>,
    pub next_id: AtomicI64,
    pub fail_text: bool,
    pub fail_photo: bool,
    pub fail_video: bool,
    pub fail_group: bool,
    pub fail_animation: bool,
    pub fail_copy: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call, fail: bool) -> SiphonResult<MessagePointer> {
        if fail {
            return Err(DeliveryError::upload("mock transport failure").into());
        }
        self.calls.lock().push(call);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessagePointer::single(42, id))
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn send_text(&self, _target: &ChatTarget, text: &str, _buttons: Option<&ButtonSpec>) -> SiphonResult<MessagePointer> {
        self.record(Call::Text(text.to_string()), self.fail_text)
    }

    async fn send_photo(&self, _target: &ChatTarget, photo: &MediaLocation, _caption: &str, _buttons: Option<&ButtonSpec>) -> SiphonResult<MessagePointer> {
        self.record(Call::Photo(photo.clone()), self.fail_photo)
    }

    async fn send_video(&self, _target: &ChatTarget, video: &OutgoingMedia, _buttons: Option<&ButtonSpec>) -> SiphonResult<MessagePointer> {
        self.record(Call::Video(video.caption.clone()), self.fail_video)
    }

    async fn send_animation(&self, _target: &ChatTarget, animation: &OutgoingMedia, _buttons: Option<&ButtonSpec>) -> SiphonResult<MessagePointer> {
        self.record(Call::Animation(animation.caption.clone()), self.fail_animation)
    }

    async fn send_media_group(&self, _target: &ChatTarget, items: &[OutgoingMedia]) -> SiphonResult<Vec<MessagePointer>> {
        let kinds = items.iter().map(|i| i.kind).collect();
        let first = self.record(Call::Group(kinds), self.fail_group)?;
        Ok((0..items.len() as i64)
            .map(|offset| MessagePointer::single(first.chat_id, first.message_id * 100 + offset))
            .collect())
    }

    async fn copy_message(&self, _target: &ChatTarget, source: &MessagePointer) -> SiphonResult<MessagePointer> {
        self.record(Call::Copy(source.message_id), self.fail_copy)
    }

    async fn copy_media_group(&self, _target: &ChatTarget, source: &MessagePointer) -> SiphonResult<Vec<MessagePointer>> {
        Ok(vec![self.record(Call::CopyGroup(source.message_id), self.fail_copy)?])
    }

    async fn edit_text(&self, _target: &CallbackTarget, text: &str, buttons: Option<&ButtonSpec>) -> SiphonResult<()> {
        self.record(Call::Edit(text.to_string(), buttons.cloned()), false).map(|_| ())
    }

    async fn answer_inline(&self, _query: &InlineQuery, results: &[InlineResult]) -> SiphonResult<()> {
        self.record(Call::Inline(results.to_vec()), false).map(|_| ())
    }
}

/// Image host that fails for files whose name contains "bad".
#[derive(Default)]
pub struct MockRelay {
    pub attempts: AtomicUsize,
    pub fail_all: bool,
}

#[async_trait]
impl ImageRelay for MockRelay {
    async fn relay(&self, path: &Path) -> SiphonResult<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
        if self.fail_all || name.contains("bad") {
            return Err(DeliveryError::new(DeliveryErrorKind::Relay(name)).into());
        }
        Ok(format!("https://img.example/{name}"))
    }
}

/// Publisher that records the page bodies it receives.
#[derive(Default)]
pub struct MockPublisher {
    pub pages: Mutex<Vec<String>>,
}

#[async_trait]
impl ArticlePublisher for MockPublisher {
    async fn publish(&self, _title: &str, html: &str) -> SiphonResult<String> {
        let mut pages = self.pages.lock();
        pages.push(html.to_string());
        Ok(format!("https://pages.example/{}", pages.len()))
    }
}

/// Summarizer that counts invocations.
#[derive(Default)]
pub struct MockSummarizer {
    pub calls: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, entry: &CacheEntry) -> SiphonResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DeliveryError::new(DeliveryErrorKind::Summary("model unavailable".into())).into());
        }
        Ok(format!("Summary of {}", entry.parse.title()))
    }
}

/// Chat every test delivers into.
pub fn target() -> ChatTarget {
    ChatTarget {
        chat_id: 42,
        reply_to: None,
    }
}
