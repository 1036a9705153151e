//! One remote file being written to disk.

use futures_util::StreamExt;
use siphon_error::{DownloadError, DownloadErrorKind, SiphonResult};
use siphon_interface::{FetchStream, Fetcher};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

pub(crate) struct Transfer {
    file: File,
    path: PathBuf,
    stream: FetchStream,
    downloaded: u64,
}

fn io_error(path: &Path, e: std::io::Error) -> DownloadError {
    DownloadError::new(DownloadErrorKind::Io(format!("{}: {}", path.display(), e)))
}

impl Transfer {
    pub(crate) async fn open(
        fetcher: &dyn Fetcher,
        url: &str,
        proxy: Option<&str>,
        path: &Path,
    ) -> SiphonResult<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        let stream = fetcher.fetch(url, proxy).await?;
        let file = File::create(path).await.map_err(|e| io_error(path, e))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            stream,
            downloaded: 0,
        })
    }

    pub(crate) fn total(&self) -> Option<u64> {
        self.stream.total
    }

    /// Write the next chunk. `None` once the body is exhausted.
    pub(crate) async fn advance(&mut self) -> SiphonResult<Option<u64>> {
        match self.stream.chunks.next().await {
            Some(chunk) => {
                let chunk = chunk?;
                self.file
                    .write_all(&chunk)
                    .await
                    .map_err(|e| io_error(&self.path, e))?;
                self.downloaded += chunk.len() as u64;
                Ok(Some(self.downloaded))
            }
            None => Ok(None),
        }
    }

    /// Flush and return the number of bytes written.
    pub(crate) async fn finish(mut self) -> SiphonResult<u64> {
        self.file
            .flush()
            .await
            .map_err(|e| io_error(&self.path, e))?;
        Ok(self.downloaded)
    }

    /// Drain the whole body.
    pub(crate) async fn run(mut self) -> SiphonResult<u64> {
        while self.advance().await?.is_some() {}
        self.finish().await
    }
}
