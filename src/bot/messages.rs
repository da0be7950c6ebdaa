//! User-facing texts and keyboards.

use super::choice::Choice;
use crate::catalog::SearchResult;
use crate::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const WELCOME: &str = "🎵 Welcome to Music Bot!\n\n\
    I can help you play music from YouTube.\n\n\
    Commands:\n\
    /play [song name] - Play a song\n\
    /help - Show this help message";

pub const HELP: &str = "How to use the bot:\n\n\
    1. Send /play [song name] to search and play a song\n\
    2. Choose from the search results\n\
    3. The bot will send you the audio file\n\n\
    You can also just send me a song name directly!";

pub const MISSING_QUERY: &str = "Please provide a song name!\n\
    Example: /play never gonna give you up";

pub const NO_RESULTS: &str = "❌ No results found. Try another search!";
pub const CANCELLED: &str = "❌ Operation cancelled.";
pub const DOWNLOADING: &str = "⬇️ Downloading audio... Please wait.";
pub const SENT: &str = "✅ Audio sent successfully!";
pub const DOWNLOAD_FAILED: &str = "❌ Failed to download audio. Please try again.";
pub const UNEXPECTED_ERROR: &str = "❌ An error occurred while downloading.";

pub const BUTTON_DOWNLOAD: &str = "🎵 Download & Send";
pub const BUTTON_CANCEL: &str = "❌ Cancel";

pub fn searching(query: &str) -> String {
    format!("🔍 Searching for: {}", query)
}

/// Format seconds as `m:ss`. Minutes are not folded into hours.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn found(result: &SearchResult) -> String {
    format!(
        "🎵 Found: {}\n⏱️ Duration: {}\n\nClick below to download:",
        result.title,
        format_duration(result.duration)
    )
}

/// Download / cancel keyboard for a search result.
pub fn result_keyboard(result: &SearchResult) -> InlineKeyboardMarkup {
    let download = Choice::Download {
        url: result.url.clone(),
    };

    InlineKeyboardMarkup::column(vec![
        InlineKeyboardButton::callback(BUTTON_DOWNLOAD, download.to_string()),
        InlineKeyboardButton::callback(BUTTON_CANCEL, Choice::Cancel.to_string()),
    ])
}
