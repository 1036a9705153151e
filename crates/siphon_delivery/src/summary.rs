//! Memoized summaries toggled from a callback button.

use crate::{ButtonState, Presenter, SummaryAction, collapse};
use siphon_core::{CacheEntry, CallbackTarget};
use siphon_error::{DeliveryError, DeliveryErrorKind, SiphonResult};
use siphon_interface::{MessageTransport, Summarizer};
use std::sync::Arc;

/// Computes a summary at most once per entry and swaps renderings.
#[derive(Clone)]
pub struct SummaryGate {
    summarizer: Arc<dyn Summarizer>,
    transport: Arc<dyn MessageTransport>,
    presenter: Presenter,
}

impl std::fmt::Debug for SummaryGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryGate")
            .field("presenter", &self.presenter)
            .finish_non_exhaustive()
    }
}

impl SummaryGate {
    /// Create a gate over an external summarizer.
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        transport: Arc<dyn MessageTransport>,
        presenter: Presenter,
    ) -> Self {
        Self {
            summarizer,
            transport,
            presenter,
        }
    }

    /// Apply a summary callback to the message behind `target`.
    ///
    /// Showing runs the summarizer only when the entry has no memoized
    /// summary. If it fails, the message is restored to its normal rendering
    /// and the failure is returned.
    #[tracing::instrument(skip(self, entry), fields(key = %action.key()))]
    pub async fn toggle(
        &self,
        entry: &mut CacheEntry,
        action: &SummaryAction,
        target: &CallbackTarget,
    ) -> SiphonResult<()> {
        let key = action.key();
        match action {
            SummaryAction::Pending(_) => {
                tracing::debug!("Summary already running");
                Ok(())
            }
            SummaryAction::Hide(_) => {
                let buttons = self.presenter.button(entry, key, ButtonState::default());
                self.transport
                    .edit_text(target, &self.presenter.caption(entry), buttons.as_ref())
                    .await
            }
            SummaryAction::Show(_) => {
                if entry.summary.is_none() {
                    let summary = self.summarize(entry, action, target).await?;
                    entry.summary = Some(summary);
                }
                let summary = entry.summary.as_deref().unwrap_or_default();
                let text = self
                    .presenter
                    .with_source(&collapse(summary), entry.parse.source_url().as_deref());
                let shown = ButtonState {
                    show_summary_result: true,
                    ..ButtonState::default()
                };
                let buttons = self.presenter.button(entry, key, shown);
                self.transport
                    .edit_text(target, &text, buttons.as_ref())
                    .await
            }
        }
    }

    async fn summarize(
        &self,
        entry: &CacheEntry,
        action: &SummaryAction,
        target: &CallbackTarget,
    ) -> SiphonResult<String> {
        let key = action.key();
        let caption = self.presenter.caption(entry);
        let running = ButtonState {
            summarizing: true,
            ..ButtonState::default()
        };
        let buttons = self.presenter.button(entry, key, running);
        self.transport
            .edit_text(target, &caption, buttons.as_ref())
            .await?;

        tracing::info!("Generating summary");
        match self.summarizer.summarize(entry).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::error!(error = %e, "Summary failed, restoring message");
                let buttons = self.presenter.button(entry, key, ButtonState::default());
                if let Err(restore) = self
                    .transport
                    .edit_text(target, &caption, buttons.as_ref())
                    .await
                {
                    tracing::warn!(error = %restore, "Failed to restore message after summary failure");
                }
                Err(DeliveryError::new(DeliveryErrorKind::Summary(e.to_string())).into())
            }
        }
    }
}
