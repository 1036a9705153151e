//! Delivery of parsed content through a chat transport.
//!
//! The [`Dispatcher`] picks one strategy per [`siphon_core::ContentShape`]
//! and degrades through simpler representations when uploads fail, down to
//! a plain text message whose failure is the only one surfaced.
//!
//! Also provided:
//! - [`collapse`]: length-based text folding shared by every message
//! - [`Presenter`]: message text, source link and keyboard
//! - [`SummaryGate`]: memoized, toggleable summaries

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dispatch;
mod format;
mod present;
mod relay;
mod strategy;
mod summary;

pub use config::{DeliveryConfig, DeliveryConfigBuilder};
pub use dispatch::{Dispatcher, RELAY_FAILED_TEXT};
pub use format::collapse;
pub use present::{ButtonState, Presenter, SummaryAction};
pub use summary::SummaryGate;
