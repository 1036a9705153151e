//! Turning parse results into local files.

use crate::transfer::Transfer;
use async_stream::stream;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use siphon_core::{DownloadResult, MediaRef, MediaSet, ParseResult, Progress};
use siphon_error::{DownloadError, DownloadErrorKind, SiphonError, SiphonResult};
use siphon_interface::Fetcher;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Completed single-file downloads below this size count as failed.
pub const DEFAULT_MIN_BYTES: u64 = 10 * 1024;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// One step of a materialization.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// Bytes or items done so far
    Progress(Progress),
    /// Final local copy; always the last event of a successful stream
    Finished(DownloadResult),
}

/// Lazy sequence of download events.
pub type DownloadStream = BoxStream<'static, SiphonResult<DownloadEvent>>;

/// Downloads a parse result's media into per-request work directories.
///
/// Each materialization writes into `<download_dir>/<uuid>/`. Nothing is
/// fetched until the returned stream is polled.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
/// use siphon_core::{MediaKind, MediaRef, ParseResult};
/// use siphon_storage::{DownloadEvent, HttpFetcher, Materializer};
/// use std::sync::Arc;
///
/// # async fn run() -> siphon_error::SiphonResult<()> {
/// let materializer = Materializer::new(Arc::new(HttpFetcher::new()?), "/tmp/siphon");
/// let parsed = ParseResult::video("clip", MediaRef::remote(MediaKind::Video, "https://cdn.ex.com/v.mp4"));
///
/// let mut events = materializer.materialize(&parsed, None, None);
/// while let Some(event) = events.next().await {
///     if let DownloadEvent::Finished(result) = event? {
///         println!("{:?}", result.media());
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Materializer {
    fetcher: Arc<dyn Fetcher>,
    download_dir: PathBuf,
    min_bytes: u64,
}

impl std::fmt::Debug for Materializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Materializer")
            .field("download_dir", &self.download_dir)
            .field("min_bytes", &self.min_bytes)
            .finish_non_exhaustive()
    }
}

impl Materializer {
    /// Create a materializer writing below `download_dir`.
    pub fn new(fetcher: Arc<dyn Fetcher>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            download_dir: download_dir.into(),
            min_bytes: DEFAULT_MIN_BYTES,
        }
    }

    /// Override the minimum accepted single-file size.
    pub fn with_min_bytes(mut self, min_bytes: u64) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    /// Root directory for downloads.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Materialize `parse`'s media.
    ///
    /// When `existing` is given and its files are still on disk the stream
    /// yields it unchanged without any transfer. On failure every file this
    /// call wrote is removed before the error is yielded.
    pub fn materialize(
        &self,
        parse: &ParseResult,
        existing: Option<&DownloadResult>,
        proxy: Option<String>,
    ) -> DownloadStream {
        if let Some(existing) = existing.filter(|d| d.exists()) {
            tracing::debug!("Download already materialized, reusing files");
            let event = DownloadEvent::Finished(existing.clone());
            return futures_util::stream::once(async move { Ok(event) }).boxed();
        }

        let workdir = self.download_dir.join(Uuid::new_v4().to_string());
        match parse.media().clone() {
            MediaSet::Single(media) => self.single(media, workdir, proxy),
            MediaSet::Many(items) => self.many(items, workdir, proxy),
        }
    }

    fn single(&self, media: MediaRef, workdir: PathBuf, proxy: Option<String>) -> DownloadStream {
        let fetcher = Arc::clone(&self.fetcher);
        let min_bytes = self.min_bytes;

        stream! {
            let Some(url) = media.url().map(str::to_string) else {
                yield Ok(DownloadEvent::Finished(DownloadResult::new(MediaSet::Single(media), None)));
                return;
            };

            let path = workdir.join(format!("0.{}", media.extension()));
            tracing::info!(url = %url, path = %path.display(), "Downloading media");

            let mut transfer = match Transfer::open(&*fetcher, &url, proxy.as_deref(), &path).await {
                Ok(transfer) => transfer,
                Err(e) => {
                    yield Err(abandon(&workdir, e).await);
                    return;
                }
            };
            let total = transfer.total();
            let mut last_emit = Instant::now();

            loop {
                match transfer.advance().await {
                    Ok(Some(downloaded)) => {
                        if last_emit.elapsed() >= PROGRESS_INTERVAL {
                            last_emit = Instant::now();
                            yield Ok(DownloadEvent::Progress(Progress::bytes(downloaded, total)));
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(abandon(&workdir, e).await);
                        return;
                    }
                }
            }

            let size = match transfer.finish().await {
                Ok(size) => size,
                Err(e) => {
                    yield Err(abandon(&workdir, e).await);
                    return;
                }
            };
            yield Ok(DownloadEvent::Progress(Progress::bytes(size, total.or(Some(size)))));

            if size < min_bytes {
                tracing::warn!(size, min_bytes, "Downloaded file too small, discarding");
                let error = DownloadError::new(DownloadErrorKind::Undersized { bytes: size, minimum: min_bytes });
                yield Err(abandon(&workdir, error.into()).await);
                return;
            }

            tracing::info!(size, "Download complete");
            yield Ok(DownloadEvent::Finished(DownloadResult::new(
                MediaSet::Single(media.relocated(path)),
                Some(workdir),
            )));
        }
        .boxed()
    }

    fn many(&self, items: Vec<MediaRef>, workdir: PathBuf, proxy: Option<String>) -> DownloadStream {
        let fetcher = Arc::clone(&self.fetcher);

        stream! {
            let count = items.len() as u64;
            let mut local = Vec::with_capacity(items.len());
            let mut wrote_any = false;

            for (index, media) in items.into_iter().enumerate() {
                match media.url().map(str::to_string) {
                    None => local.push(media),
                    Some(url) => {
                        let path = workdir.join(format!("{}.{}", index, media.extension()));
                        tracing::debug!(index, url = %url, "Downloading item");
                        wrote_any = true;
                        let written = match Transfer::open(&*fetcher, &url, proxy.as_deref(), &path).await {
                            Ok(transfer) => transfer.run().await,
                            Err(e) => Err(e),
                        };
                        if let Err(e) = written {
                            yield Err(abandon(&workdir, e).await);
                            return;
                        }
                        local.push(media.relocated(path));
                    }
                }
                yield Ok(DownloadEvent::Progress(Progress::items(index as u64 + 1, count)));
            }

            tracing::info!(items = count, "Batch download complete");
            yield Ok(DownloadEvent::Finished(DownloadResult::new(
                MediaSet::Many(local),
                wrote_any.then_some(workdir),
            )));
        }
        .boxed()
    }
}

/// Remove a failed download's work directory and hand back the error.
async fn abandon(workdir: &Path, error: SiphonError) -> SiphonError {
    tracing::warn!(error = %error, dir = %workdir.display(), "Download failed, removing partial files");
    if let Err(e) = tokio::fs::remove_dir_all(workdir).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(error = %e, "Failed to remove partial download");
    }
    error
}
