//! reqwest-backed media fetcher.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::{Client, Proxy};
use siphon_error::{DownloadError, DownloadErrorKind, HttpError, SiphonResult};
use siphon_interface::{FetchStream, Fetcher};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Streams remote media over HTTP.
///
/// Requests without a proxy share one client; proxied requests build a
/// client for that proxy.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a browser-like user agent.
    pub fn new() -> SiphonResult<Self> {
        Ok(Self {
            client: Self::client(None)?,
        })
    }

    fn client(proxy: Option<&str>) -> SiphonResult<Client> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(proxy) = proxy {
            let proxy = Proxy::all(proxy)
                .map_err(|e| HttpError::invalid_proxy(proxy, e))?;
            builder = builder.proxy(proxy);
        }
        builder
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)).into())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[tracing::instrument(skip(self), fields(proxied = proxy.is_some()))]
    async fn fetch(&self, url: &str, proxy: Option<&str>) -> SiphonResult<FetchStream> {
        let client = match proxy {
            Some(_) => Self::client(proxy)?,
            None => self.client.clone(),
        };

        let response = client.get(url).send().await.map_err(|e| {
            DownloadError::new(DownloadErrorKind::Transfer(format!("Failed to fetch: {}", e)))
        })?;

        if !response.status().is_success() {
            return Err(DownloadError::new(DownloadErrorKind::Transfer(format!(
                "HTTP error: {}",
                response.status()
            )))
            .into());
        }

        let total = response.content_length();
        tracing::debug!(?total, "Transfer started");

        let chunks = response
            .bytes_stream()
            .map(|chunk| -> SiphonResult<Bytes> {
                chunk.map_err(|e| {
                    DownloadError::new(DownloadErrorKind::Transfer(format!("Stream error: {}", e)))
                        .into()
                })
            })
            .boxed();

        Ok(FetchStream { total, chunks })
    }
}
