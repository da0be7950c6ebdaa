//! Telegram Bot API client over reqwest.

use super::types::{ApiResponse, InlineKeyboardMarkup, Message, MessageRef, Update, User};
use super::{ChatApi, UpdateSource};
use crate::config::Settings;
use crate::error::{LydError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Request timeout; must stay above the long-polling timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Update kinds the bot subscribes to.
const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// Thin client for the subset of the Bot API the bot uses.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// Create a client from settings that already carry a token.
    pub fn new(settings: &Settings) -> Result<Self> {
        let timeout = DEFAULT_TIMEOUT_SECS.max(settings.telegram.poll_timeout_secs + 10);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self::with_http_client(
            http,
            &settings.telegram.api_url,
            settings.token()?,
        ))
    }

    pub fn with_http_client(http: reqwest::Client, api_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// POST a JSON body to a Bot API method and unwrap the envelope.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method, "Bot API call");

        // Strip URLs from transport errors: they contain the token.
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| LydError::Http(e.without_url()))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| LydError::Http(e.without_url()))?;

        unwrap_envelope(envelope)
    }
}

fn unwrap_envelope<T>(envelope: ApiResponse<T>) -> Result<T> {
    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse {
            error_code,
            description,
            ..
        } => Err(LydError::Telegram {
            code: error_code.unwrap_or(0),
            description: description.unwrap_or_else(|| "empty response".to_string()),
        }),
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn get_me(&self) -> Result<User> {
        self.call("getMe", &json!({})).await
    }

    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ALLOWED_UPDATES,
            }),
        )
        .await
    }
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<MessageRef> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(markup) = markup {
            body["reply_markup"] = serde_json::to_value(markup)?;
        }

        let message: Message = self.call("sendMessage", &body).await?;
        Ok(MessageRef::from(&message))
    }

    async fn edit_message_text(
        &self,
        message: MessageRef,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut body = json!({
            "chat_id": message.chat_id,
            "message_id": message.message_id,
            "text": text,
        });
        if let Some(markup) = markup {
            body["reply_markup"] = serde_json::to_value(markup)?;
        }

        // Result is either the edited Message or `true`.
        let _: serde_json::Value = self.call("editMessageText", &body).await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_query_id }),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn send_audio(&self, chat_id: i64, path: &Path, title: &str, performer: &str) -> Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let part = Part::bytes(bytes).file_name(file_name).mime_str("audio/mpeg")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("title", title.to_string())
            .text("performer", performer.to_string())
            .part("audio", part);

        let response = self
            .http
            .post(self.method_url("sendAudio"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| LydError::Http(e.without_url()))?;

        let envelope: ApiResponse<Message> = response
            .json()
            .await
            .map_err(|e| LydError::Http(e.without_url()))?;

        unwrap_envelope(envelope).map(|_| ())
    }
}
