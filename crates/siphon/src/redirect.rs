//! reqwest-backed redirect resolution.

use async_trait::async_trait;
use reqwest::{Client, Proxy, redirect::Policy};
use siphon_error::{HttpError, ResolveError, ResolveErrorKind, SiphonResult};
use siphon_interface::RedirectResolver;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Maximum hops followed for one short link.
pub const MAX_REDIRECTS: usize = 10;

/// Follows short links with HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpRedirectResolver {
    client: Client,
}

impl HttpRedirectResolver {
    /// Create a resolver, optionally routed through `proxy`.
    pub fn new(proxy: Option<&str>) -> SiphonResult<Self> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::limited(MAX_REDIRECTS));
        if let Some(proxy) = proxy {
            let proxy = Proxy::all(proxy)
                .map_err(|e| HttpError::invalid_proxy(proxy, e))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RedirectResolver for HttpRedirectResolver {
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, url: &str) -> SiphonResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            ResolveError::new(ResolveErrorKind::Redirect(format!("{}: {}", url, e)))
        })?;
        Ok(response.url().to_string())
    }
}
