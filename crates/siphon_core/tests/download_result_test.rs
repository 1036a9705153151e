//! Tests for download results and cache entries.

use siphon_core::{CacheEntry, DownloadResult, MediaKind, MediaRef, MediaSet, ParseResult};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"payload").expect("Failed to write file");
    path
}

#[tokio::test]
async fn test_exists_tracks_disk_state() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let first = write_file(&dir, "0.jpg");
    let second = write_file(&dir, "1.jpg");

    let result = DownloadResult::new(
        MediaSet::Many(vec![
            MediaRef::local(MediaKind::Image, &first),
            MediaRef::local(MediaKind::Image, &second),
        ]),
        None,
    );
    assert!(result.exists());

    std::fs::remove_file(&second).expect("Failed to remove file");
    assert!(!result.exists());
}

#[tokio::test]
async fn test_remote_media_never_exists() {
    let result = DownloadResult::new(
        MediaSet::Single(MediaRef::remote(MediaKind::Video, "https://cdn.ex.com/v.mp4")),
        None,
    );
    assert!(!result.exists());
}

#[tokio::test]
async fn test_delete_removes_files_and_workdir() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let workdir = root.path().join("batch");
    std::fs::create_dir_all(&workdir).expect("Failed to create workdir");
    let file = workdir.join("0.mp4");
    std::fs::write(&file, b"video").expect("Failed to write file");

    let result = DownloadResult::new(
        MediaSet::Single(MediaRef::local(MediaKind::Video, &file)),
        Some(workdir.clone()),
    );
    result.delete().await.expect("Delete should succeed");

    assert!(!file.exists());
    assert!(!workdir.exists());

    // Deleting twice is harmless.
    result.delete().await.expect("Second delete should succeed");
}

#[tokio::test]
async fn test_cache_entry_ignores_stale_download() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let file = write_file(&dir, "0.jpg");

    let mut entry = CacheEntry::new(ParseResult::images("t", vec![]));
    entry.download = Some(DownloadResult::new(
        MediaSet::Many(vec![MediaRef::local(MediaKind::Image, &file)]),
        None,
    ));
    assert!(entry.valid_download().is_some());

    entry.release().await.expect("Release should succeed");
    assert!(entry.valid_download().is_none());
}
