//! Error types for Lydbot.

use thiserror::Error;

/// Library-level error type for Lydbot operations.
#[derive(Error, Debug)]
pub enum LydError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No results found for: {0}")]
    NoResults(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Telegram API error ({code}): {description}")]
    Telegram { code: i64, description: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LydError {
    /// Whether the error came out of the download step itself
    /// (as opposed to the chat transport or the local filesystem).
    pub fn is_download_failure(&self) -> bool {
        matches!(
            self,
            LydError::AudioDownload(_) | LydError::ToolNotFound(_) | LydError::ToolFailed(_)
        )
    }
}

/// Result type alias for Lydbot operations.
pub type Result<T> = std::result::Result<T, LydError>;
