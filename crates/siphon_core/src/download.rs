//! Locally materialized media.

use crate::MediaSet;
use siphon_error::{DownloadError, DownloadErrorKind, SiphonResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Local copy of a parse result's media.
///
/// Owns its backing files: [`DownloadResult::delete`] removes every local
/// media file and the work directory the orchestrator created for it.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    media: MediaSet,
    workdir: Option<PathBuf>,
}

impl DownloadResult {
    /// Wrap materialized media and the directory that holds it.
    pub fn new(media: MediaSet, workdir: Option<PathBuf>) -> Self {
        Self { media, workdir }
    }

    /// The local media.
    pub fn media(&self) -> &MediaSet {
        &self.media
    }

    /// Directory created for this download, if any.
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    /// True iff every item is local and its file is still on disk.
    pub fn exists(&self) -> bool {
        self.media.items().iter().all(|m| m.exists())
    }

    /// Remove the backing files. Missing files are not an error.
    #[tracing::instrument(skip(self), fields(items = self.media.len()))]
    pub async fn delete(&self) -> SiphonResult<()> {
        for path in self.media.items().iter().filter_map(|m| m.path()) {
            match tokio::fs::remove_file(path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Deleted media file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(DownloadError::new(DownloadErrorKind::Io(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )))
                    .into());
                }
            }
        }

        if let Some(dir) = &self.workdir {
            match tokio::fs::remove_dir_all(dir).await {
                Ok(()) => tracing::debug!(dir = %dir.display(), "Deleted download directory"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(DownloadError::new(DownloadErrorKind::Io(format!(
                        "{}: {}",
                        dir.display(),
                        e
                    )))
                    .into());
                }
            }
        }
        Ok(())
    }
}
