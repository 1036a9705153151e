//! HTTP client setup errors.

/// Failure to build an HTTP client, with source location.
///
/// Request-time failures are reported in the domain of the request
/// (download transfer, redirect resolution). This error covers client
/// construction: TLS backend setup and proxy parsing.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", message, line, file)]
pub struct HttpError {
    /// What went wrong
    pub message: String,
    /// Proxy URL that was rejected, if any
    pub proxy: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Client construction failure.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::at(message.into(), None)
    }

    /// A proxy URL the client refused.
    ///
    /// ```
    /// use siphon_error::HttpError;
    ///
    /// let err = HttpError::invalid_proxy("socks9://x", "unknown scheme");
    /// assert_eq!(err.proxy.as_deref(), Some("socks9://x"));
    /// assert!(err.to_string().contains("Invalid proxy socks9://x"));
    /// ```
    #[track_caller]
    pub fn invalid_proxy(proxy: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let proxy = proxy.into();
        Self::at(format!("Invalid proxy {}: {}", proxy, reason), Some(proxy))
    }

    #[track_caller]
    fn at(message: String, proxy: Option<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message,
            proxy,
            line: location.line(),
            file: location.file(),
        }
    }
}
