//! Per-interaction session handling.
//!
//! Each inbound event walks a short state machine:
//! `Searching -> {ResultsShown | NoResults}` for a query, then
//! `{Downloading -> {Sent | Failed}, Cancelled}` once a button is pressed.
//! Nothing is remembered between events.

use super::choice::Choice;
use super::messages;
use crate::audio::{AudioFetcher, StagedFile};
use crate::catalog::{Catalog, SearchResult};
use crate::config::Settings;
use crate::error::{LydError, Result};
use crate::telegram::{CallbackQuery, ChatApi, MessageRef};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// How a search request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The query was blank; the user was asked for a song name.
    MissingQuery,
    ResultsShown(SearchResult),
    NoResults,
}

/// How a button press ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceOutcome {
    Cancelled,
    Sent,
    Failed,
    /// Unrecognized payload or no message to edit.
    Ignored,
}

/// Handles commands, plain messages and button presses for all chats.
pub struct SessionHandler {
    chat: Arc<dyn ChatApi>,
    catalog: Arc<dyn Catalog>,
    fetcher: Arc<dyn AudioFetcher>,
    settings: Arc<Settings>,
}

impl SessionHandler {
    pub fn new(
        chat: Arc<dyn ChatApi>,
        catalog: Arc<dyn Catalog>,
        fetcher: Arc<dyn AudioFetcher>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            chat,
            catalog,
            fetcher,
            settings,
        }
    }

    pub async fn on_start(&self, chat_id: i64) -> Result<()> {
        self.chat.send_message(chat_id, messages::WELCOME, None).await?;
        Ok(())
    }

    pub async fn on_help(&self, chat_id: i64) -> Result<()> {
        self.chat.send_message(chat_id, messages::HELP, None).await?;
        Ok(())
    }

    /// Search for `query` and offer the first match.
    #[instrument(skip(self))]
    pub async fn on_play(&self, chat_id: i64, query: &str) -> Result<PlayOutcome> {
        if query.trim().is_empty() {
            self.chat
                .send_message(chat_id, messages::MISSING_QUERY, None)
                .await?;
            return Ok(PlayOutcome::MissingQuery);
        }

        let status = self
            .chat
            .send_message(chat_id, &messages::searching(query), None)
            .await?;

        match self.catalog.search(query).await {
            Ok(result) => {
                info!(title = %result.title, "Offering search result");
                let keyboard = messages::result_keyboard(&result);
                self.chat
                    .edit_message_text(status, &messages::found(&result), Some(&keyboard))
                    .await?;
                Ok(PlayOutcome::ResultsShown(result))
            }
            Err(e) => {
                match &e {
                    LydError::NoResults(_) => info!("No results"),
                    other => warn!("Search error: {}", other),
                }
                self.chat
                    .edit_message_text(status, messages::NO_RESULTS, None)
                    .await?;
                Ok(PlayOutcome::NoResults)
            }
        }
    }

    /// Non-command text is an implicit `/play`.
    pub async fn on_plain_message(&self, chat_id: i64, text: &str) -> Result<Option<PlayOutcome>> {
        if text.starts_with('/') {
            return Ok(None);
        }
        self.on_play(chat_id, text).await.map(Some)
    }

    /// Handle a press on the download / cancel keyboard.
    #[instrument(skip(self, query), fields(callback_id = %query.id, user_id = query.from.id))]
    pub async fn on_choice(&self, query: &CallbackQuery) -> Result<ChoiceOutcome> {
        // Acknowledge first so the client does not time out the press.
        if let Err(e) = self.chat.answer_callback_query(&query.id).await {
            warn!("Failed to answer callback query: {}", e);
        }

        let Some(message) = query.message.as_ref() else {
            debug!("Callback without an accessible message");
            return Ok(ChoiceOutcome::Ignored);
        };
        let status = MessageRef::from(message);

        let choice = match query.data.as_deref().map(str::parse::<Choice>) {
            Some(Ok(choice)) => choice,
            Some(Err(e)) => {
                debug!("Ignoring callback: {}", e);
                return Ok(ChoiceOutcome::Ignored);
            }
            None => return Ok(ChoiceOutcome::Ignored),
        };

        match choice {
            Choice::Cancel => {
                self.chat
                    .edit_message_text(status, messages::CANCELLED, None)
                    .await?;
                Ok(ChoiceOutcome::Cancelled)
            }
            Choice::Download { url } => self.download_and_send(status, &url).await,
        }
    }

    async fn download_and_send(&self, status: MessageRef, url: &str) -> Result<ChoiceOutcome> {
        self.chat
            .edit_message_text(status, messages::DOWNLOADING, None)
            .await?;

        let staged = match self.fetcher.fetch(url).await {
            Ok(staged) => staged,
            Err(e) => {
                let text = if e.is_download_failure() {
                    warn!(%url, "Download error: {}", e);
                    messages::DOWNLOAD_FAILED
                } else {
                    error!(%url, "Unexpected error while downloading: {}", e);
                    messages::UNEXPECTED_ERROR
                };
                self.chat.edit_message_text(status, text, None).await?;
                return Ok(ChoiceOutcome::Failed);
            }
        };

        let sent = self.send_staged(status.chat_id, &staged).await;

        // The staged file goes away whether or not the upload worked.
        if let Err(e) = staged.remove().await {
            warn!("Failed to remove staged file: {}", e);
        }

        match sent {
            Ok(()) => {
                self.chat.edit_message_text(status, messages::SENT, None).await?;
                Ok(ChoiceOutcome::Sent)
            }
            Err(e) => {
                error!(%url, "Failed to send audio: {}", e);
                self.chat
                    .edit_message_text(status, messages::UNEXPECTED_ERROR, None)
                    .await?;
                Ok(ChoiceOutcome::Failed)
            }
        }
    }

    async fn send_staged(&self, chat_id: i64, staged: &StagedFile) -> Result<()> {
        info!(path = %staged.path().display(), "Sending audio");
        self.chat
            .send_audio(
                chat_id,
                staged.path(),
                &staged.title(),
                &self.settings.bot.performer,
            )
            .await
    }

    /// Report an error that escaped a handler. Never fails.
    pub fn on_error(&self, update_id: i64, error: &dyn std::fmt::Display) {
        error!(update_id, "Update {} caused error {}", update_id, error);
    }
}
