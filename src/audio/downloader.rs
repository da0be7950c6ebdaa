//! Audio download via yt-dlp.
//!
//! yt-dlp fetches the best audio stream and hands it to ffmpeg for the
//! conversion to the configured container and bitrate.

use super::{AudioFetcher, StagedFile};
use crate::config::{DownloadSettings, Settings};
use crate::error::{LydError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Downloads and transcodes audio with yt-dlp into the staging directory.
pub struct YtDlpFetcher {
    settings: DownloadSettings,
    staging_dir: PathBuf,
}

impl YtDlpFetcher {
    pub fn new(settings: &Settings) -> Self {
        Self::with_staging_dir(settings.download.clone(), settings.staging_dir())
    }

    pub fn with_staging_dir(settings: DownloadSettings, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            staging_dir: staging_dir.into(),
        }
    }

    /// Run yt-dlp and return its stdout.
    async fn run_ytdlp(&self, url: &str, template: &Path) -> Result<String> {
        let result = Command::new(&self.settings.ytdlp_path)
            .arg("--format").arg(&self.settings.format)
            .arg("--extract-audio")
            .arg("--audio-format").arg(&self.settings.audio_format)
            .arg("--audio-quality").arg(&self.settings.audio_quality)
            .arg("--output").arg(template)
            .arg("--print").arg("after_move:filepath")
            .arg("--no-simulate")
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LydError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(LydError::AudioDownload(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LydError::AudioDownload(format!("yt-dlp failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Work out which file yt-dlp produced.
///
/// Prefers the path yt-dlp printed after post-processing; otherwise looks for
/// a file with the target extension inside the job directory.
fn resolve_output(stdout: &str, job_dir: &Path, audio_format: &str) -> Option<PathBuf> {
    let printed = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(PathBuf::from);

    if let Some(path) = printed {
        if path.is_file() {
            return Some(path);
        }
        // The printed name may still carry the source extension.
        let converted = path.with_extension(audio_format);
        if converted.is_file() {
            return Some(converted);
        }
    }

    std::fs::read_dir(job_dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .find(|p| {
            p.is_file()
                && p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case(audio_format))
                    .unwrap_or(false)
        })
}

#[async_trait]
impl AudioFetcher for YtDlpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<StagedFile> {
        tokio::fs::create_dir_all(&self.staging_dir).await?;

        // Each download gets its own directory so identical titles never clash.
        let job_dir = self.staging_dir.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&job_dir).await?;

        let template = job_dir.join(&self.settings.output_template);
        info!("Downloading audio from {}", url);

        let outcome = match self.run_ytdlp(url, &template).await {
            Ok(stdout) => resolve_output(&stdout, &job_dir, &self.settings.audio_format)
                .ok_or_else(|| LydError::AudioDownload("Audio file not found after download".into())),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(path) => {
                debug!(path = %path.display(), "Audio staged");
                Ok(StagedFile::in_job_dir(path, job_dir))
            }
            Err(e) => {
                // Leave nothing half-written behind.
                if let Err(cleanup) = tokio::fs::remove_dir_all(&job_dir).await {
                    warn!("Failed to clean up {}: {}", job_dir.display(), cleanup);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher_with(program: &str, staging: &Path) -> YtDlpFetcher {
        YtDlpFetcher::with_staging_dir(
            DownloadSettings {
                ytdlp_path: program.to_string(),
                ..DownloadSettings::default()
            },
            staging,
        )
    }

    fn staging_is_empty(staging: &Path) -> bool {
        std::fs::read_dir(staging).unwrap().next().is_none()
    }

    #[test]
    fn test_resolve_printed_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Believer.mp3");
        std::fs::write(&file, b"audio").unwrap();

        let stdout = format!("{}\n", file.display());
        assert_eq!(resolve_output(&stdout, dir.path(), "mp3"), Some(file));
    }

    #[test]
    fn test_resolve_swaps_source_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Believer.mp3");
        std::fs::write(&file, b"audio").unwrap();

        let stdout = format!("{}\n", dir.path().join("Believer.webm").display());
        assert_eq!(resolve_output(&stdout, dir.path(), "mp3"), Some(file));
    }

    #[test]
    fn test_resolve_scans_job_dir_without_print() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Believer.webm.part"), b"x").unwrap();
        let file = dir.path().join("Believer.mp3");
        std::fs::write(&file, b"audio").unwrap();

        assert_eq!(resolve_output("", dir.path(), "mp3"), Some(file));
    }

    #[test]
    fn test_resolve_nothing_produced() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Believer.webm"), b"x").unwrap();
        assert_eq!(resolve_output("", dir.path(), "mp3"), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let staging = tempfile::tempdir().unwrap();
        let fetcher = fetcher_with("lydbot-definitely-not-installed", staging.path());

        let err = fetcher.fetch("https://www.youtube.com/watch?v=x").await.unwrap_err();
        assert!(matches!(err, LydError::ToolNotFound(_)));
        assert!(staging_is_empty(staging.path()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_run_leaves_no_job_dir() {
        let staging = tempfile::tempdir().unwrap();
        let fetcher = fetcher_with("false", staging.path());

        let err = fetcher.fetch("https://www.youtube.com/watch?v=x").await.unwrap_err();
        assert!(matches!(err, LydError::AudioDownload(_)));
        assert!(staging_is_empty(staging.path()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_without_output_file_is_download_error() {
        let staging = tempfile::tempdir().unwrap();
        let fetcher = fetcher_with("true", staging.path());

        let err = fetcher.fetch("https://www.youtube.com/watch?v=x").await.unwrap_err();
        assert!(err.is_download_failure());
        assert!(staging_is_empty(staging.path()));
    }

    #[tokio::test]
    async fn test_staging_dir_created_when_absent() {
        let root = tempfile::tempdir().unwrap();
        let staging = root.path().join("downloads");
        let fetcher = fetcher_with("lydbot-definitely-not-installed", &staging);

        let _ = fetcher.fetch("https://www.youtube.com/watch?v=x").await;
        assert!(staging.is_dir());
    }
}
