//! Download orchestration and local media storage.
//!
//! [`Materializer`] turns a parse result's remote media into local files,
//! reporting progress as a lazy stream of [`DownloadEvent`]s. Remote bytes
//! come from a [`siphon_interface::Fetcher`]; [`HttpFetcher`] is the
//! reqwest-backed implementation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod fetch;
mod materialize;
mod transfer;

pub use fetch::HttpFetcher;
pub use materialize::{DEFAULT_MIN_BYTES, DownloadEvent, DownloadStream, Materializer};
