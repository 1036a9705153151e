//! Extraction-side capabilities.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use siphon_core::{CanonicalReference, ParseOptions, ParseResult};
use siphon_error::SiphonResult;

/// How a plugin wants its URLs normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRules {
    /// Query parameters that identify content and must be kept
    pub reserved_params: Vec<String>,
    /// Substrings that mark a short link to be followed first
    pub redirect_triggers: Vec<String>,
}

/// A platform-specific extractor.
///
/// Plugins are treated as pure functions of a URL.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use siphon_core::{CanonicalReference, ParseOptions, ParseResult};
/// use siphon_error::SiphonResult;
/// use siphon_interface::Plugin;
///
/// struct Gallery;
///
/// #[async_trait]
/// impl Plugin for Gallery {
///     fn id(&self) -> &str {
///         "gallery"
///     }
///
///     fn matches(&self, url: &str) -> bool {
///         url.contains("gallery.example")
///     }
///
///     async fn parse(
///         &self,
///         reference: &CanonicalReference,
///         _options: &ParseOptions,
///     ) -> SiphonResult<ParseResult> {
///         Ok(ParseResult::images(reference.as_str(), vec![]))
///     }
/// }
/// ```
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Stable identifier, also the key for platform overrides.
    fn id(&self) -> &str;

    /// Whether this plugin handles the URL.
    fn matches(&self, url: &str) -> bool;

    /// Extract content from a canonical reference.
    async fn parse(
        &self,
        reference: &CanonicalReference,
        options: &ParseOptions,
    ) -> SiphonResult<ParseResult>;

    /// Normalization rules for this plugin's URLs.
    fn canonical_rules(&self) -> CanonicalRules {
        CanonicalRules::default()
    }

    /// Match precedence. Higher wins; ties keep registration order.
    fn priority(&self) -> i32 {
        0
    }
}

/// Follows a redirect chain to its final location.
#[async_trait]
pub trait RedirectResolver: Send + Sync {
    /// Final URL after following redirects from `url`.
    async fn resolve(&self, url: &str) -> SiphonResult<String>;
}

/// An open byte stream for one remote file.
pub struct FetchStream {
    /// Content length when the server declared it
    pub total: Option<u64>,
    /// Body chunks in order
    pub chunks: BoxStream<'static, SiphonResult<Bytes>>,
}

/// Opens remote media for streaming.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Start a transfer, optionally through a proxy.
    async fn fetch(&self, url: &str, proxy: Option<&str>) -> SiphonResult<FetchStream>;
}
