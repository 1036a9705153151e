//! Core data types for the siphon resolution engine.
//!
//! This crate provides the data model shared by the cache, download,
//! delivery and engine crates: canonical references and their hashes,
//! parsed content, downloaded media and delivered message pointers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod delivery;
mod download;
mod entry;
mod media;
mod parse;
mod platform;
mod progress;
mod reference;

pub use delivery::{
    Button, ButtonSpec, CallbackTarget, ChatTarget, Delivered, DeliveredMessagePointer,
    InlineQuery, MessagePointer,
};
pub use download::DownloadResult;
pub use entry::CacheEntry;
pub use media::{MediaKind, MediaLocation, MediaRef, MediaSet, SubtitleCue, Subtitles};
pub use parse::{ContentShape, ParseResult};
pub use platform::{ParseOptions, PlatformOverride};
pub use progress::{Progress, ProgressThrottle, ProgressUnit};
pub use reference::{CanonicalReference, UrlHash};
