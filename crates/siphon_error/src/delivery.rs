//! Delivery and summarization errors.

/// Kinds of delivery errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DeliveryErrorKind {
    /// The transport rejected an upload or send
    #[display("Upload failed: {}", _0)]
    Upload(String),
    /// A recorded message could not be replayed
    #[display("Replay failed: {}", _0)]
    Replay(String),
    /// An image could not be relayed to the image host
    #[display("Image relay failed: {}", _0)]
    Relay(String),
    /// The long-form page could not be published
    #[display("Article publish failed: {}", _0)]
    Publish(String),
    /// The summarizer failed
    #[display("Summary failed: {}", _0)]
    Summary(String),
}

/// Delivery error with location tracking.
///
/// # Examples
///
/// ```
/// use siphon_error::{DeliveryError, DeliveryErrorKind};
///
/// let err = DeliveryError::new(DeliveryErrorKind::Upload("chat not found".into()));
/// assert!(format!("{}", err).contains("Upload failed"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Delivery Error: {} at line {} in {}", kind, line, file)]
pub struct DeliveryError {
    /// The kind of error that occurred
    pub kind: DeliveryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DeliveryError {
    /// Create a new delivery error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DeliveryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a transport upload failure.
    #[track_caller]
    pub fn upload(message: impl Into<String>) -> Self {
        Self::new(DeliveryErrorKind::Upload(message.into()))
    }
}
