//! Capability traits consumed by the siphon engine.
//!
//! The engine never talks to a platform or a chat service directly. It
//! depends on the traits defined here:
//!
//! - [`Plugin`]: platform-specific extraction
//! - [`RedirectResolver`]: follows short-link redirects
//! - [`Fetcher`]: streams remote media bytes
//! - [`MessageTransport`]: sends and copies chat messages
//! - [`ImageRelay`], [`ArticlePublisher`]: large image-set fallback
//! - [`Summarizer`], [`VideoSplitter`]: optional capabilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod plugin;
mod transport;

pub use plugin::{CanonicalRules, FetchStream, Fetcher, Plugin, RedirectResolver};
pub use transport::{
    ArticlePublisher, ImageRelay, InlineResult, MessageTransport, OutgoingMedia, Summarizer,
    Unsplit, VideoSplitter,
};
