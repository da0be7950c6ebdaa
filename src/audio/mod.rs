//! Audio download and staging.
//!
//! Downloaded files live in the staging directory only between the download
//! and the upload to the chat. [`StagedFile`] owns such a file and removes it.

mod downloader;

pub use downloader::YtDlpFetcher;

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Trait for audio download providers.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Download the audio behind `url` into the staging area.
    async fn fetch(&self, url: &str) -> Result<StagedFile>;
}

/// A locally materialized audio file waiting to be sent.
///
/// The file (and its per-download directory, if any) is deleted by
/// [`StagedFile::remove`], or on drop if `remove` was never called.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    job_dir: Option<PathBuf>,
    removed: bool,
}

impl StagedFile {
    /// Wrap a file that is not inside a dedicated job directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            job_dir: None,
            removed: false,
        }
    }

    /// Wrap a file whose parent job directory should go away with it.
    pub fn in_job_dir(path: impl Into<PathBuf>, job_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            job_dir: Some(job_dir.into()),
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display title: the file name without its extension.
    pub fn title(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string())
    }

    /// Delete the file and its job directory, leftovers included.
    ///
    /// The job directory is cleared even when the file itself is already gone;
    /// that error is still returned.
    pub async fn remove(mut self) -> Result<()> {
        self.removed = true;
        debug!(path = %self.path.display(), "Removing staged file");

        let removed = tokio::fs::remove_file(&self.path).await;
        if let Some(dir) = &self.job_dir {
            if let Err(e) = tokio::fs::remove_dir_all(dir).await {
                warn!(dir = %dir.display(), "Failed to remove job directory: {}", e);
            }
        }
        removed?;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        warn!(path = %self.path.display(), "Staged file dropped without removal, deleting");
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), "Failed to remove staged file: {}", e);
        }
        if let Some(dir) = &self.job_dir {
            if let Err(e) = std::fs::remove_dir_all(dir) {
                warn!(dir = %dir.display(), "Failed to remove job directory: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_strips_extension() {
        let staged = StagedFile::new("/tmp/nowhere/Imagine Dragons - Believer.mp3");
        assert_eq!(staged.title(), "Imagine Dragons - Believer");
    }

    #[test]
    fn test_title_keeps_inner_dots() {
        let staged = StagedFile::new("/tmp/nowhere/Mr. Brightside.mp3");
        assert_eq!(staged.title(), "Mr. Brightside");
    }

    #[tokio::test]
    async fn test_remove_deletes_file_and_job_dir() {
        let staging = tempfile::tempdir().unwrap();
        let job_dir = staging.path().join("job");
        std::fs::create_dir_all(&job_dir).unwrap();
        let file = job_dir.join("Song.mp3");
        std::fs::write(&file, b"audio").unwrap();

        let staged = StagedFile::in_job_dir(&file, &job_dir);
        staged.remove().await.unwrap();

        assert!(!file.exists());
        assert!(!job_dir.exists());
        assert!(staging.path().exists());
    }

    #[tokio::test]
    async fn test_remove_clears_leftovers_in_job_dir() {
        let staging = tempfile::tempdir().unwrap();
        let job_dir = staging.path().join("job");
        std::fs::create_dir_all(&job_dir).unwrap();
        let file = job_dir.join("Song.mp3");
        std::fs::write(&file, b"audio").unwrap();
        std::fs::write(job_dir.join("Song.webm"), b"source").unwrap();

        StagedFile::in_job_dir(&file, &job_dir).remove().await.unwrap();

        assert!(!job_dir.exists());
        assert!(staging.path().exists());
    }

    #[tokio::test]
    async fn test_remove_clears_job_dir_when_file_is_gone() {
        let staging = tempfile::tempdir().unwrap();
        let job_dir = staging.path().join("job");
        std::fs::create_dir_all(&job_dir).unwrap();
        std::fs::write(job_dir.join("Song.webm"), b"source").unwrap();

        let staged = StagedFile::in_job_dir(job_dir.join("Song.mp3"), &job_dir);
        tokio_test::assert_err!(staged.remove().await);

        assert!(!job_dir.exists());
    }

    #[test]
    fn test_drop_clears_leftovers_in_job_dir() {
        let staging = tempfile::tempdir().unwrap();
        let job_dir = staging.path().join("job");
        std::fs::create_dir_all(&job_dir).unwrap();
        let file = job_dir.join("Song.mp3");
        std::fs::write(&file, b"audio").unwrap();
        std::fs::write(job_dir.join("Song.webm"), b"source").unwrap();

        drop(StagedFile::in_job_dir(&file, &job_dir));

        assert!(!job_dir.exists());
    }

    #[test]
    fn test_drop_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Song.mp3");
        std::fs::write(&file, b"audio").unwrap();

        drop(StagedFile::new(&file));

        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedFile::new(dir.path().join("gone.mp3"));
        tokio_test::assert_err!(staged.remove().await);
    }
}
