//! YouTube catalog implementation backed by yt-dlp search.

use super::{Catalog, SearchResult};
use crate::config::DownloadSettings;
use crate::error::{LydError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Fields we read from a `yt-dlp --dump-json` entry.
#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    id: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    webpage_url: Option<String>,
    thumbnail: Option<String>,
}

impl YtDlpEntry {
    fn into_result(self) -> Option<SearchResult> {
        let url = self.webpage_url.or_else(|| {
            self.id
                .as_ref()
                .map(|id| format!("https://www.youtube.com/watch?v={}", id))
        })?;

        Some(SearchResult {
            title: self.title.unwrap_or_else(|| "Unknown Title".to_string()),
            duration: self.duration.filter(|d| *d > 0.0).map(|d| d as u64).unwrap_or(0),
            url,
            thumbnail: self.thumbnail.unwrap_or_default(),
        })
    }
}

/// Searches YouTube through `yt-dlp ytsearch1:`.
pub struct YoutubeCatalog {
    ytdlp_path: String,
}

impl YoutubeCatalog {
    pub fn new(settings: &DownloadSettings) -> Self {
        Self {
            ytdlp_path: settings.ytdlp_path.clone(),
        }
    }

    /// Parse yt-dlp's line-delimited JSON output, keeping only the first entry.
    fn parse_first(stdout: &str) -> Result<Option<SearchResult>> {
        let Some(line) = stdout.lines().find(|l| !l.trim().is_empty()) else {
            return Ok(None);
        };

        let entry: YtDlpEntry = serde_json::from_str(line)
            .map_err(|e| LydError::Search(format!("Failed to parse yt-dlp output: {}", e)))?;

        Ok(entry.into_result())
    }
}

impl Default for YoutubeCatalog {
    fn default() -> Self {
        Self::new(&DownloadSettings::default())
    }
}

#[async_trait]
impl Catalog for YoutubeCatalog {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<SearchResult> {
        let target = format!("ytsearch1:{}", query);

        let output = tokio::process::Command::new(&self.ytdlp_path)
            .args([
                "--dump-json",
                "--no-download",
                "--no-warnings",
                "--no-playlist",
                &target,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LydError::ToolNotFound("yt-dlp".to_string())
                } else {
                    LydError::Search(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LydError::Search(format!("yt-dlp search failed: {}", stderr.trim())));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = Self::parse_first(&stdout)?
            .ok_or_else(|| LydError::NoResults(query.to_string()))?;

        debug!(title = %result.title, url = %result.url, "Search matched");
        Ok(result)
    }
}
