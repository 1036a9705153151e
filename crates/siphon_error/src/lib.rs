//! Error types for the siphon resolution engine.
//!
//! This crate provides the error types shared by every siphon crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use siphon_error::{ResolveError, ResolveErrorKind, SiphonResult};
//!
//! fn select(url: &str) -> SiphonResult<()> {
//!     Err(ResolveError::new(ResolveErrorKind::UnsupportedPlatform(url.to_string())))?
//! }
//!
//! let err = select("https://unknown.example").unwrap_err();
//! assert!(err.is_unsupported_platform());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod delivery;
mod download;
mod error;
mod http;
mod resolve;

pub use config::ConfigError;
pub use delivery::{DeliveryError, DeliveryErrorKind};
pub use download::{DownloadError, DownloadErrorKind};
pub use error::{SiphonError, SiphonErrorKind, SiphonResult};
pub use http::HttpError;
pub use resolve::{ResolveError, ResolveErrorKind};
