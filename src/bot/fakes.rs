//! Recording fakes of the chat, catalog and fetcher for handler tests.

use crate::audio::{AudioFetcher, StagedFile};
use crate::catalog::{Catalog, SearchResult};
use crate::error::{LydError, Result};
use crate::telegram::{CallbackQuery, Chat, ChatApi, InlineKeyboardMarkup, Message, MessageRef, User};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

pub fn believer() -> SearchResult {
    SearchResult {
        title: "Believer".to_string(),
        duration: 204,
        url: "https://www.youtube.com/watch?v=7wtfhZwyrcc".to_string(),
        thumbnail: String::new(),
    }
}

/// A button press on message 9 in chat 42.
pub fn callback(data: &str) -> CallbackQuery {
    CallbackQuery {
        id: "cbq-1".to_string(),
        from: User {
            id: 42,
            is_bot: false,
            first_name: "Ann".to_string(),
            username: None,
        },
        message: Some(Message {
            message_id: 9,
            chat: Chat { id: 42 },
            from: None,
            text: None,
        }),
        data: Some(data.to_string()),
    }
}

/// One outbound call observed by [`FakeChat`].
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Message {
        chat_id: i64,
        text: String,
        markup: Option<InlineKeyboardMarkup>,
    },
    Edit {
        message: MessageRef,
        text: String,
        markup: Option<InlineKeyboardMarkup>,
    },
    Answer {
        id: String,
    },
    Audio {
        chat_id: i64,
        path: PathBuf,
        title: String,
        performer: String,
    },
}

pub struct FakeChat {
    calls: Mutex<Vec<Sent>>,
    next_id: AtomicI64,
    fail_uploads: bool,
}

impl FakeChat {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(100),
            fail_uploads: false,
        }
    }

    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<Sent> {
        self.calls.lock().unwrap().clone()
    }

    /// Text of the most recent send or edit.
    pub fn last_text(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|c| match c {
            Sent::Message { text, .. } | Sent::Edit { text, .. } => Some(text),
            _ => None,
        })
    }

    fn record(&self, call: Sent) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatApi for FakeChat {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<MessageRef> {
        self.record(Sent::Message {
            chat_id,
            text: text.to_string(),
            markup: markup.cloned(),
        });
        Ok(MessageRef {
            chat_id,
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst),
        })
    }

    async fn edit_message_text(
        &self,
        message: MessageRef,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.record(Sent::Edit {
            message,
            text: text.to_string(),
            markup: markup.cloned(),
        });
        Ok(())
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        self.record(Sent::Answer {
            id: callback_query_id.to_string(),
        });
        Ok(())
    }

    async fn send_audio(&self, chat_id: i64, path: &Path, title: &str, performer: &str) -> Result<()> {
        assert!(path.exists(), "audio must still be staged while sending");
        self.record(Sent::Audio {
            chat_id,
            path: path.to_path_buf(),
            title: title.to_string(),
            performer: performer.to_string(),
        });
        if self.fail_uploads {
            return Err(LydError::Telegram {
                code: 413,
                description: "Request Entity Too Large".to_string(),
            });
        }
        Ok(())
    }
}

pub struct FakeCatalog {
    result: Option<SearchResult>,
    broken: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with(result: SearchResult) -> Self {
        Self {
            result: Some(result),
            broken: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self {
            result: None,
            broken: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::empty()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search(&self, query: &str) -> Result<SearchResult> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.broken {
            return Err(LydError::Search("yt-dlp search failed".to_string()));
        }
        self.result
            .clone()
            .ok_or_else(|| LydError::NoResults(query.to_string()))
    }
}

enum FetchMode {
    Produce { dir: PathBuf, name: String },
    Fail,
    Io,
}

pub struct FakeFetcher {
    mode: FetchMode,
    urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    /// Writes `dir/name` on every fetch.
    pub fn producing(dir: &Path, name: &str) -> Self {
        Self {
            mode: FetchMode::Produce {
                dir: dir.to_path_buf(),
                name: name.to_string(),
            },
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            mode: FetchMode::Fail,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn io_error() -> Self {
        Self {
            mode: FetchMode::Io,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<StagedFile> {
        self.urls.lock().unwrap().push(url.to_string());
        match &self.mode {
            FetchMode::Produce { dir, name } => {
                let path = dir.join(name);
                std::fs::write(&path, b"ID3")?;
                Ok(StagedFile::new(path))
            }
            FetchMode::Fail => Err(LydError::AudioDownload(
                "Audio file not found after download".to_string(),
            )),
            FetchMode::Io => Err(LydError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "staging directory is read-only",
            ))),
        }
    }
}
