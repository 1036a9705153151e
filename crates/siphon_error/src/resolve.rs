//! Errors raised while turning a reference into parsed content.

/// Kinds of resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ResolveErrorKind {
    /// No registered plugin matches the reference
    #[display("Unsupported platform: {}", _0)]
    UnsupportedPlatform(String),
    /// An opaque token could not be mapped back to a reference
    #[display("Reference not found for token: {}", _0)]
    ReferenceNotFound(String),
    /// A plugin failed to extract content
    #[display("Parse failure: {}", _0)]
    ParseFailure(String),
    /// Following a redirect chain failed
    #[display("Redirect resolution failed: {}", _0)]
    Redirect(String),
}

/// Resolution error with location tracking.
///
/// # Examples
///
/// ```
/// use siphon_error::{ResolveError, ResolveErrorKind};
///
/// let err = ResolveError::new(ResolveErrorKind::ReferenceNotFound("0f".repeat(16)));
/// assert!(format!("{}", err).contains("Reference not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Resolve Error: {} at line {} in {}", kind, line, file)]
pub struct ResolveError {
    /// The kind of error that occurred
    pub kind: ResolveErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ResolveError {
    /// Create a new resolution error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ResolveErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a plugin extraction failure.
    #[track_caller]
    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self::new(ResolveErrorKind::ParseFailure(message.into()))
    }
}
