//! Configuration error types.

/// Configuration error with source location.
///
/// `key` names the offending setting when a single value was rejected.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Setting that failed validation
    pub key: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Configuration failure not tied to one setting.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::at(message.into(), None)
    }

    /// A setting whose value the engine cannot run with.
    ///
    /// ```
    /// use siphon_error::ConfigError;
    ///
    /// let err = ConfigError::invalid("batch_size", "must be between 1 and 10, got 0");
    /// assert_eq!(err.key.as_deref(), Some("batch_size"));
    /// assert!(err.message.starts_with("batch_size must be"));
    /// ```
    #[track_caller]
    pub fn invalid(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::at(format!("{} {}", key, reason), Some(key.to_string()))
    }

    #[track_caller]
    fn at(message: String, key: Option<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message,
            key,
            line: location.line(),
            file: location.file(),
        }
    }
}
