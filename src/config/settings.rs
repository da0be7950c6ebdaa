//! Configuration settings for Lydbot.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the Telegram bot token.
pub const TOKEN_ENV: &str = "BOT_TOKEN";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub telegram: TelegramSettings,
    pub download: DownloadSettings,
    pub bot: BotSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where downloaded audio is staged before sending.
    pub staging_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            staging_dir: "downloads".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    /// Base URL of the Bot API.
    pub api_url: String,
    /// Long-polling timeout passed to getUpdates, in seconds.
    pub poll_timeout_secs: u64,
    /// Bot token. Never written back to disk.
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
            token: None,
        }
    }
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// yt-dlp download and transcode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Path or name of the yt-dlp executable.
    pub ytdlp_path: String,
    /// yt-dlp format selector.
    pub format: String,
    /// Target audio container.
    pub audio_format: String,
    /// Target audio quality (bitrate or VBR level).
    pub audio_quality: String,
    /// Output file name template, relative to the staging directory.
    pub output_template: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            format: "bestaudio/best".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "192K".to_string(),
            output_template: "%(title)s.%(ext)s".to_string(),
        }
    }
}

/// Chat-facing bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Performer label attached to every sent audio file.
    pub performer: String,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            performer: "Music Bot".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lydbot")
            .join("config.toml")
    }

    /// Attach the bot token, failing when it is missing or blank.
    pub fn with_token(mut self, token: Option<String>) -> crate::error::Result<Self> {
        match token.map(|t| t.trim().to_string()) {
            Some(t) if !t.is_empty() => {
                self.telegram.token = Some(t);
                Ok(self)
            }
            _ => Err(crate::error::LydError::Config(format!(
                "No {} found in environment variables",
                TOKEN_ENV
            ))),
        }
    }

    /// The bot token. Only valid after [`Settings::with_token`] succeeded.
    pub fn token(&self) -> crate::error::Result<&str> {
        self.telegram.token.as_deref().ok_or_else(|| {
            crate::error::LydError::Config(format!("{} has not been configured", TOKEN_ENV))
        })
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded staging directory path.
    pub fn staging_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.staging_dir)
    }
}
