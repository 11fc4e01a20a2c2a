//! Shared test helpers for creating ArchiveDownloader instances in tests.

use crate::config::Config;
use crate::downloader::ArchiveDownloader;
use crate::types::{TaskId, TaskView};
use std::time::Duration;
use tempfile::tempdir;

/// Config rooted in a fresh temp dir with short timeouts.
/// Returns the config and the tempdir (which must be kept alive).
pub(crate) fn test_config() -> (Config, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = Config {
        temp_folder: temp_dir.path().join("files"),
        fetch_timeout: Duration::from_secs(5),
        shutdown_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    (config, temp_dir)
}

/// Helper to create a test ArchiveDownloader instance.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader() -> (ArchiveDownloader, tempfile::TempDir) {
    let (config, temp_dir) = test_config();
    let downloader = ArchiveDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}

/// Same as [`create_test_downloader`] with a caller-adjusted config
pub(crate) async fn create_test_downloader_with(
    adjust: impl FnOnce(&mut Config),
) -> (ArchiveDownloader, tempfile::TempDir) {
    let (mut config, temp_dir) = test_config();
    adjust(&mut config);
    let downloader = ArchiveDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}

/// Poll until the task reaches done or err, panicking after 10 seconds.
pub(crate) async fn wait_for_terminal(downloader: &ArchiveDownloader, id: &TaskId) -> TaskView {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let view = downloader.task_status(id).await.unwrap();
        if view.status.is_terminal() {
            return view;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "task {id} still {} after 10s",
            view.status
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
