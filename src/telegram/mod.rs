//! Telegram transport for Lydbot.
//!
//! The bot logic talks to the chat through the [`ChatApi`] trait;
//! [`TelegramClient`] is the production implementation.

mod client;
pub mod types;

pub use client::TelegramClient;
pub use types::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, MessageRef, Update,
    User,
};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Inbound side of the chat: where the update loop gets its work from.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Identify the bot; fails on an invalid token.
    async fn get_me(&self) -> Result<User>;

    /// Long-poll for new updates starting at `offset`.
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>>;
}

/// Outbound chat operations used by the session handler.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send a text message, optionally with an inline keyboard.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<MessageRef>;

    /// Replace the text (and keyboard) of a message the bot sent earlier.
    async fn edit_message_text(
        &self,
        message: MessageRef,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// Acknowledge a button press so the client stops its spinner.
    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()>;

    /// Upload a local audio file.
    async fn send_audio(&self, chat_id: i64, path: &Path, title: &str, performer: &str) -> Result<()>;
}
