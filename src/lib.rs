//! Lydbot - YouTube audio on request, over Telegram
//!
//! A Telegram bot that looks up a song on YouTube, offers the first match,
//! and on confirmation sends it back as an MP3.
//!
//! The name "Lyd" is Norwegian for "sound."
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `catalog` - Song search (yt-dlp `ytsearch`)
//! - `audio` - Audio download, transcoding, and staging
//! - `telegram` - Bot API client and the `ChatApi` seam
//! - `bot` - Commands, button payloads, session handling, update loop
//! - `cli` - Command-line flags and startup checks
//!
//! # Example
//!
//! ```rust,no_run
//! use lydbot::audio::YtDlpFetcher;
//! use lydbot::bot::{Dispatcher, SessionHandler};
//! use lydbot::catalog::YoutubeCatalog;
//! use lydbot::config::Settings;
//! use lydbot::telegram::TelegramClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Arc::new(Settings::load()?.with_token(std::env::var("BOT_TOKEN").ok())?);
//!     let client = TelegramClient::new(&settings)?;
//!
//!     let handler = Arc::new(SessionHandler::new(
//!         Arc::new(client.clone()),
//!         Arc::new(YoutubeCatalog::new(&settings.download)),
//!         Arc::new(YtDlpFetcher::new(&settings)),
//!         settings.clone(),
//!     ));
//!
//!     Dispatcher::new(client, handler, settings.telegram.poll_timeout_secs)
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod bot;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod telegram;

pub use error::{LydError, Result};
