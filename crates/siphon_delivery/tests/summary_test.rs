//! Tests for the summary toggle.

mod test_utils;

use siphon_core::{Button, CacheEntry, CallbackTarget, CanonicalReference, ParseResult, UrlHash};
use siphon_delivery::{Presenter, SummaryAction, SummaryGate};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use test_utils::{Call, MockSummarizer, MockTransport};

fn key() -> UrlHash {
    CanonicalReference::new("https://ex.com/a/1").hash()
}

fn entry() -> CacheEntry {
    CacheEntry::new(
        ParseResult::images("Long read", vec![])
            .with_description("Very long text")
            .with_source_url("https://ex.com/a/1"),
    )
}

fn callback() -> CallbackTarget {
    CallbackTarget {
        callback_id: "cb".into(),
    }
}

fn summary_label(call: &Call) -> Option<String> {
    let Call::Edit(_, Some(spec)) = call else {
        return None;
    };
    spec.buttons.iter().find_map(|b| match b {
        Button::Callback { label, .. } => Some(label.clone()),
        Button::Link { .. } => None,
    })
}

#[tokio::test]
async fn test_summary_is_computed_once() {
    let transport = Arc::new(MockTransport::new());
    let summarizer = Arc::new(MockSummarizer::default());
    let gate = SummaryGate::new(summarizer.clone(), transport.clone(), Presenter::new(true));
    let mut entry = entry();

    gate.toggle(&mut entry, &SummaryAction::Show(key()), &callback())
        .await
        .expect("First show should succeed");
    gate.toggle(&mut entry, &SummaryAction::Hide(key()), &callback())
        .await
        .expect("Hide should succeed");
    gate.toggle(&mut entry, &SummaryAction::Show(key()), &callback())
        .await
        .expect("Second show should succeed");

    assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(entry.summary.as_deref(), Some("Summary of Long read"));

    let calls = transport.calls();
    // Running state, summary, normal rendering, summary again.
    assert_eq!(calls.len(), 4);
    assert!(summary_label(&calls[0]).is_some_and(|l| l.contains('⏳')));
    assert!(matches!(&calls[1], Call::Edit(text, _) if text.starts_with("Summary of Long read")));
    assert!(summary_label(&calls[1]).is_some_and(|l| l.contains('✅')));
    assert!(summary_label(&calls[2]).is_some_and(|l| l.contains('❎')));
}

#[tokio::test]
async fn test_pending_press_is_ignored() {
    let transport = Arc::new(MockTransport::new());
    let summarizer = Arc::new(MockSummarizer::default());
    let gate = SummaryGate::new(summarizer.clone(), transport.clone(), Presenter::new(true));
    let mut entry = entry();

    gate.toggle(&mut entry, &SummaryAction::Pending(key()), &callback())
        .await
        .expect("Pending press should be a no-op");

    assert!(transport.calls().is_empty());
    assert_eq!(summarizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_summary_restores_message() {
    let transport = Arc::new(MockTransport::new());
    let summarizer = Arc::new(MockSummarizer {
        fail: true,
        ..Default::default()
    });
    let gate = SummaryGate::new(summarizer, transport.clone(), Presenter::new(true));
    let mut entry = entry();

    let err = gate
        .toggle(&mut entry, &SummaryAction::Show(key()), &callback())
        .await
        .expect_err("Summary failure should surface");

    assert!(format!("{err}").contains("Summary failed"));
    assert!(entry.summary.is_none());

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert!(summary_label(&calls[1]).is_some_and(|l| l.contains('❎')));
    let (Call::Edit(running, _), Call::Edit(restored, _)) = (&calls[0], &calls[1]) else {
        panic!("Expected two edits, got {calls:?}");
    };
    assert_eq!(running, restored);
}
