//! Top-level error wrapper types.

use crate::{ConfigError, DeliveryError, DownloadError, HttpError, ResolveError};
use crate::{DeliveryErrorKind, DownloadErrorKind, ResolveErrorKind};

/// Every error a siphon operation can raise.
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum SiphonErrorKind {
    /// Canonicalization, plugin selection or parsing error
    #[from(ResolveError)]
    Resolve(ResolveError),
    /// Download orchestration error
    #[from(DownloadError)]
    Download(DownloadError),
    /// Delivery, replay or summary error
    #[from(DeliveryError)]
    Delivery(DeliveryError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP client error
    #[from(HttpError)]
    Http(HttpError),
}

/// Siphon error with kind discrimination.
///
/// # Examples
///
/// ```
/// use siphon_error::{ConfigError, SiphonResult};
///
/// fn might_fail() -> SiphonResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Siphon Error: {}", _0)]
pub struct SiphonError(Box<SiphonErrorKind>);

impl SiphonError {
    /// Create a new error from a kind.
    pub fn new(kind: SiphonErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SiphonErrorKind {
        &self.0
    }

    /// True when no plugin accepts the reference.
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(
            self.kind(),
            SiphonErrorKind::Resolve(ResolveError {
                kind: ResolveErrorKind::UnsupportedPlatform(_),
                ..
            })
        )
    }

    /// True when an opaque token could not be resolved.
    pub fn is_reference_not_found(&self) -> bool {
        matches!(
            self.kind(),
            SiphonErrorKind::Resolve(ResolveError {
                kind: ResolveErrorKind::ReferenceNotFound(_),
                ..
            })
        )
    }

    /// True for plugin extraction failures.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self.kind(),
            SiphonErrorKind::Resolve(ResolveError {
                kind: ResolveErrorKind::ParseFailure(_),
                ..
            })
        )
    }

    /// True for any download failure, including undersized transfers.
    pub fn is_download_failure(&self) -> bool {
        matches!(self.kind(), SiphonErrorKind::Download(_))
    }

    /// True when the final delivery attempt failed.
    pub fn is_upload_failure(&self) -> bool {
        matches!(
            self.kind(),
            SiphonErrorKind::Delivery(DeliveryError {
                kind: DeliveryErrorKind::Upload(_),
                ..
            })
        )
    }

    /// True when the transferred file was below the minimum size.
    pub fn is_undersized(&self) -> bool {
        matches!(
            self.kind(),
            SiphonErrorKind::Download(DownloadError {
                kind: DownloadErrorKind::Undersized { .. },
                ..
            })
        )
    }
}

impl<T> From<T> for SiphonError
where
    T: Into<SiphonErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for siphon operations.
pub type SiphonResult<T> = std::result::Result<T, SiphonError>;
