//! Test utilities for engine tests.
//!
//! In-memory plugin, fetcher, redirect resolver, transport and summarizer.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use parking_lot::Mutex;
use siphon::{
    ButtonSpec, CacheEntry, CallbackTarget, CanonicalReference, CanonicalRules, ChatTarget,
    DeliveryError, DownloadError, DownloadErrorKind, FetchStream, Fetcher, InlineQuery,
    InlineResult, MediaLocation, MessagePointer, MessageTransport, OutgoingMedia, ParseOptions,
    ParseResult, Plugin, RedirectResolver, ResolveError, ResolveErrorKind, SiphonResult,
    Summarizer,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

type Responder = Arc<dyn Fn(&CanonicalReference) -> SiphonResult<ParseResult> + Send + Sync>;

/// Plugin for one host that counts parse calls.
pub struct MockPlugin {
    id: String,
    host: String,
    priority: i32,
    rules: CanonicalRules,
    delay: Duration,
    responder: Responder,
    pub parses: Arc<AtomicUsize>,
}

impl MockPlugin {
    /// Plugin accepting URLs on `host` and returning an empty image set.
    pub fn new(id: &str, host: &str) -> Self {
        Self {
            id: id.to_string(),
            host: host.to_string(),
            priority: 0,
            rules: CanonicalRules::default(),
            delay: Duration::ZERO,
            responder: Arc::new(|r| Ok(ParseResult::images("Post", vec![]).with_source_url(r.as_str()))),
            parses: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_reserved_params(mut self, params: &[&str]) -> Self {
        self.rules.reserved_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_redirect_trigger(mut self, trigger: &str) -> Self {
        self.rules.redirect_triggers.push(trigger.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_result(
        mut self,
        responder: impl Fn(&CanonicalReference) -> SiphonResult<ParseResult> + Send + Sync + 'static,
    ) -> Self {
        self.responder = Arc::new(responder);
        self
    }

    pub fn with_parse_failure(self) -> Self {
        self.with_result(|r| Err(ResolveError::parse_failure(format!("nothing at {}", r)).into()))
    }
}

#[async_trait]
impl Plugin for MockPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, url: &str) -> bool {
        url.contains(&self.host)
    }

    async fn parse(&self, reference: &CanonicalReference, _options: &ParseOptions) -> SiphonResult<ParseResult> {
        self.parses.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.responder)(reference)
    }

    fn canonical_rules(&self) -> CanonicalRules {
        self.rules.clone()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// Redirects from a fixed table.
#[derive(Default)]
pub struct MockRedirects {
    pub targets: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl MockRedirects {
    pub fn with(mut self, from: &str, to: &str) -> Self {
        self.targets.insert(from.to_string(), to.to_string());
        self
    }
}

#[async_trait]
impl RedirectResolver for MockRedirects {
    async fn resolve(&self, url: &str) -> SiphonResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.get(url).cloned().ok_or_else(|| {
            ResolveError::new(ResolveErrorKind::Redirect(format!("dead link {}", url))).into()
        })
    }
}

/// Serves every URL with a fixed-size body unless failing.
#[derive(Default)]
pub struct MockFetcher {
    pub size: usize,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl MockFetcher {
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn with_failure() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, _url: &str, _proxy: Option<&str>) -> SiphonResult<FetchStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DownloadError::new(DownloadErrorKind::Transfer("HTTP error: 503".into())).into());
        }
        let body = vec![1u8; self.size];
        let chunks: Vec<SiphonResult<Bytes>> = body
            .chunks(4096)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(FetchStream {
            total: Some(self.size as u64),
            chunks: futures_util::stream::iter(chunks).boxed(),
        })
    }
}

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Text(String),
    Photo,
    Video,
    Animation,
    Group(usize),
    Copy(i64),
    CopyGroup(i64),
    Edit(String),
    Inline(usize),
}

/// Transport recording every call.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    pub fail_copy: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_copy_failure() -> Self {
        Self {
            fail_copy: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) -> MessagePointer {
        self.calls.lock().push(call);
        MessagePointer::single(7, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn send_text(&self, _target: &ChatTarget, text: &str, _buttons: Option<&ButtonSpec>) -> SiphonResult<MessagePointer> {
        Ok(self.record(Call::Text(text.to_string())))
    }

    async fn send_photo(&self, _target: &ChatTarget, _photo: &MediaLocation, _caption: &str, _buttons: Option<&ButtonSpec>) -> SiphonResult<MessagePointer> {
        Ok(self.record(Call::Photo))
    }

    async fn send_video(&self, _target: &ChatTarget, _video: &OutgoingMedia, _buttons: Option<&ButtonSpec>) -> SiphonResult<MessagePointer> {
        Ok(self.record(Call::Video))
    }

    async fn send_animation(&self, _target: &ChatTarget, _animation: &OutgoingMedia, _buttons: Option<&ButtonSpec>) -> SiphonResult<MessagePointer> {
        Ok(self.record(Call::Animation))
    }

    async fn send_media_group(&self, _target: &ChatTarget, items: &[OutgoingMedia]) -> SiphonResult<Vec<MessagePointer>> {
        Ok(vec![self.record(Call::Group(items.len()))])
    }

    async fn copy_message(&self, _target: &ChatTarget, source: &MessagePointer) -> SiphonResult<MessagePointer> {
        if self.fail_copy {
            return Err(DeliveryError::upload("message to copy not found").into());
        }
        Ok(self.record(Call::Copy(source.message_id)))
    }

    async fn copy_media_group(&self, _target: &ChatTarget, source: &MessagePointer) -> SiphonResult<Vec<MessagePointer>> {
        if self.fail_copy {
            return Err(DeliveryError::upload("message to copy not found").into());
        }
        Ok(vec![self.record(Call::CopyGroup(source.message_id))])
    }

    async fn edit_text(&self, _target: &CallbackTarget, text: &str, _buttons: Option<&ButtonSpec>) -> SiphonResult<()> {
        self.record(Call::Edit(text.to_string()));
        Ok(())
    }

    async fn answer_inline(&self, _query: &InlineQuery, results: &[InlineResult]) -> SiphonResult<()> {
        self.record(Call::Inline(results.len()));
        Ok(())
    }
}

/// Summarizer that counts invocations.
#[derive(Default)]
pub struct MockSummarizer {
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
}

impl MockSummarizer {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, entry: &CacheEntry) -> SiphonResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("In short: {}", entry.parse.title()))
    }
}

/// Chat every test delivers into.
pub fn target() -> ChatTarget {
    ChatTarget {
        chat_id: 7,
        reply_to: None,
    }
}
