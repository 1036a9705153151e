//! Download orchestration errors.

/// Kinds of download errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DownloadErrorKind {
    /// Network or HTTP status failure while transferring
    #[display("Transfer failed: {}", _0)]
    Transfer(String),
    /// The completed file was smaller than the accepted minimum
    #[display("Download too small: {} bytes (minimum {})", bytes, minimum)]
    Undersized {
        /// Bytes actually written
        bytes: u64,
        /// Configured minimum size
        minimum: u64,
    },
    /// Local filesystem failure
    #[display("I/O failure: {}", _0)]
    Io(String),
    /// A media item has neither a remote nor an existing local location
    #[display("Media is not downloadable: {}", _0)]
    NotRemote(String),
}

/// Download error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Download Error: {} at line {} in {}", kind, line, file)]
pub struct DownloadError {
    /// The kind of error that occurred
    pub kind: DownloadErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DownloadError {
    /// Create a new download error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DownloadErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
