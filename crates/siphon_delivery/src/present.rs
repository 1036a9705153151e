//! Message text and keyboards for a cache entry.

use crate::collapse;
use siphon_core::{Button, ButtonSpec, CacheEntry, UrlHash};

const UNTITLED: &str = "Untitled";
const SOURCE_LABEL: &str = "Source";
const SUMMARY_LABEL: &str = "AI Summary";

const SUMMARY_PREFIX: &str = "summary_";
const UNSUMMARY_PREFIX: &str = "unsummary_";
const SUMMARIZING_PREFIX: &str = "summarizing_";

/// Keyboard state for [`Presenter::button`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Leave out the summary button entirely
    pub hide_summary: bool,
    /// The summary is currently displayed
    pub show_summary_result: bool,
    /// A summary is being produced
    pub summarizing: bool,
}

/// What a summary callback asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryAction {
    /// Show the summary
    Show(UrlHash),
    /// Go back to the normal rendering
    Hide(UrlHash),
    /// Pressed while a summary is running
    Pending(UrlHash),
}

impl SummaryAction {
    /// Decode callback data produced by [`Presenter::button`].
    ///
    /// ```
    /// use siphon_delivery::SummaryAction;
    ///
    /// let data = format!("unsummary_{}", "ab".repeat(16));
    /// assert!(matches!(SummaryAction::parse(&data), Some(SummaryAction::Hide(_))));
    /// assert!(SummaryAction::parse("summary_nothex").is_none());
    /// ```
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(token) = data.strip_prefix(UNSUMMARY_PREFIX) {
            UrlHash::parse(token).map(Self::Hide)
        } else if let Some(token) = data.strip_prefix(SUMMARIZING_PREFIX) {
            UrlHash::parse(token).map(Self::Pending)
        } else if let Some(token) = data.strip_prefix(SUMMARY_PREFIX) {
            UrlHash::parse(token).map(Self::Show)
        } else {
            None
        }
    }

    /// Hash token carried by the callback.
    pub fn key(&self) -> &UrlHash {
        match self {
            Self::Show(key) | Self::Hide(key) | Self::Pending(key) => key,
        }
    }
}

/// Renders entries into message text and keyboards.
#[derive(Debug, Clone, Copy, Default)]
pub struct Presenter {
    summary_enabled: bool,
}

impl Presenter {
    /// Presenter that offers the summary button when `summary_enabled`.
    pub fn new(summary_enabled: bool) -> Self {
        Self { summary_enabled }
    }

    /// Title and description, or a link to the published article.
    pub fn content_text(&self, entry: &CacheEntry) -> String {
        let parse = &entry.parse;
        if let Some(url) = &entry.article_url {
            let title = if parse.title().is_empty() {
                UNTITLED
            } else {
                parse.title().as_str()
            };
            return format!("[{title}]({url})");
        }

        let mut parts = Vec::new();
        if !parse.title().is_empty() {
            parts.push(format!("**{}**", parse.title()));
        }
        if !parse.description().is_empty() {
            parts.push(parse.description().clone());
        }
        collapse(&parts.join("\n\n"))
    }

    /// Append the source link when there is one.
    pub fn with_source(&self, text: &str, source_url: Option<&str>) -> String {
        match source_url {
            Some(url) => format!("{text}\n\n<b>▎[{SOURCE_LABEL}]({url})</b>"),
            None => text.to_string(),
        }
    }

    /// Full caption: content text plus source link.
    pub fn caption(&self, entry: &CacheEntry) -> String {
        self.with_source(
            &self.content_text(entry),
            entry.parse.source_url().as_deref(),
        )
    }

    /// Keyboard for an entry, or none when it has no source link.
    pub fn button(&self, entry: &CacheEntry, key: &UrlHash, state: ButtonState) -> Option<ButtonSpec> {
        let url = entry.parse.source_url().as_ref()?;
        let mut buttons = vec![Button::Link {
            label: SOURCE_LABEL.to_string(),
            url: url.clone(),
        }];

        if self.summary_enabled && !state.hide_summary {
            let (label, prefix) = if state.summarizing {
                (format!("{SUMMARY_LABEL} ⏳"), SUMMARIZING_PREFIX)
            } else if state.show_summary_result {
                (format!("{SUMMARY_LABEL} ✅"), UNSUMMARY_PREFIX)
            } else {
                (format!("{SUMMARY_LABEL} ❎"), SUMMARY_PREFIX)
            };
            buttons.push(Button::Callback {
                label,
                data: format!("{prefix}{key}"),
            });
        }
        Some(ButtonSpec { buttons })
    }
}
