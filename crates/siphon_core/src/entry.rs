//! Cache entries.

use crate::{DownloadResult, ParseResult};
use siphon_error::SiphonResult;

/// Everything the engine remembers about one canonical reference.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Parsed content, owned by the entry
    pub parse: ParseResult,
    /// Local copy of the media, once materialized
    pub download: Option<DownloadResult>,
    /// Memoized summary text
    pub summary: Option<String>,
    /// Published long-form page for this content
    pub article_url: Option<String>,
}

impl CacheEntry {
    /// Fresh entry for a newly parsed result.
    pub fn new(parse: ParseResult) -> Self {
        Self {
            parse,
            download: None,
            summary: None,
            article_url: None,
        }
    }

    /// The attached download, but only while its files still exist.
    pub fn valid_download(&self) -> Option<&DownloadResult> {
        self.download.as_ref().filter(|d| d.exists())
    }

    /// Delete the backing files of the attached download.
    pub async fn release(&self) -> SiphonResult<()> {
        match &self.download {
            Some(download) => download.delete().await,
            None => Ok(()),
        }
    }
}
