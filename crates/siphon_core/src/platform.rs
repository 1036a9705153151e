//! Per-platform overrides.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Optional proxy and cookie settings for one plugin.
///
/// Looked up by plugin id; never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformOverride {
    /// Ignore the global parser proxy for this platform
    #[serde(default)]
    pub disable_parser_proxy: bool,
    /// Ignore the global downloader proxy for this platform
    #[serde(default)]
    pub disable_downloader_proxy: bool,
    /// Proxies to pick from while parsing
    #[serde(default)]
    pub parser_proxies: Vec<String>,
    /// Proxies to pick from while downloading
    #[serde(default)]
    pub downloader_proxies: Vec<String>,
    /// Cookies to pick from while parsing
    #[serde(default)]
    pub cookies: Vec<String>,
}

impl PlatformOverride {
    /// Proxy for the parse stage.
    ///
    /// Platform proxies win over the global one; `disable_parser_proxy`
    /// suppresses the global fallback.
    ///
    /// ```
    /// use siphon_core::PlatformOverride;
    ///
    /// let mut platform = PlatformOverride::default();
    /// assert_eq!(platform.parser_proxy(Some("http://g:1")), Some("http://g:1".to_string()));
    ///
    /// platform.disable_parser_proxy = true;
    /// assert_eq!(platform.parser_proxy(Some("http://g:1")), None);
    /// ```
    pub fn parser_proxy(&self, global: Option<&str>) -> Option<String> {
        pick(&self.parser_proxies)
            .or_else(|| global.filter(|_| !self.disable_parser_proxy).map(str::to_string))
    }

    /// Proxy for the download stage.
    pub fn downloader_proxy(&self, global: Option<&str>) -> Option<String> {
        pick(&self.downloader_proxies)
            .or_else(|| global.filter(|_| !self.disable_downloader_proxy).map(str::to_string))
    }

    /// One of the configured cookies, chosen at random.
    pub fn cookie(&self) -> Option<String> {
        pick(&self.cookies)
    }

    /// Options handed to a plugin's parse call.
    pub fn parse_options(&self, global_proxy: Option<&str>) -> ParseOptions {
        ParseOptions {
            proxy: self.parser_proxy(global_proxy),
            cookie: self.cookie(),
        }
    }
}

fn pick(values: &[String]) -> Option<String> {
    values.choose(&mut rand::thread_rng()).cloned()
}

/// Per-request settings passed to a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Proxy URL to route extraction through
    pub proxy: Option<String>,
    /// Cookie header value
    pub cookie: Option<String>,
}
