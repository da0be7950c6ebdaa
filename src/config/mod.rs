//! Configuration module for Lydbot.
//!
//! Settings are loaded once at startup and shared read-only by every handler.

mod settings;

pub use settings::{
    BotSettings, DownloadSettings, GeneralSettings, Settings, TelegramSettings, TOKEN_ENV,
};
