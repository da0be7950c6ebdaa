//! Long-polling update loop.
//!
//! Every update runs on its own task, so one chat waiting on yt-dlp never
//! holds up another.

use super::command::Command;
use super::handler::SessionHandler;
use crate::error::Result;
use crate::telegram::{Update, UpdateSource};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Pause before polling again after a failed getUpdates.
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct Dispatcher {
    source: Arc<dyn UpdateSource>,
    handler: Arc<SessionHandler>,
    poll_timeout_secs: u64,
    retry_delay: Duration,
}

impl Dispatcher {
    pub fn new(
        source: impl UpdateSource + 'static,
        handler: Arc<SessionHandler>,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            source: Arc::new(source),
            handler,
            poll_timeout_secs,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Poll until Ctrl-C, then wait for in-flight updates to finish.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Poll until `shutdown` completes, then wait for in-flight updates.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let me = self.source.get_me().await?;
        info!(
            bot = me.username.as_deref().unwrap_or(&me.first_name),
            "Connected to Telegram"
        );

        tokio::pin!(shutdown);

        let mut offset = 0;
        let mut tasks = JoinSet::new();

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                polled = self.source.get_updates(offset, self.poll_timeout_secs) => polled,
            };

            match polled {
                Ok(updates) => {
                    offset = next_offset(offset, &updates);
                    for update in updates {
                        tasks.spawn(handle_update(self.handler.clone(), update));
                    }
                }
                Err(e) => {
                    warn!("Polling failed: {}", e);
                    tokio::select! {
                        _ = &mut shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }

            while tasks.try_join_next().is_some() {}
        }

        if !tasks.is_empty() {
            info!("Waiting for {} in-flight updates", tasks.len());
        }
        while tasks.join_next().await.is_some() {}

        Ok(())
    }
}

/// Offset for the next getUpdates: one past the highest update seen.
fn next_offset(offset: i64, updates: &[Update]) -> i64 {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .fold(offset, i64::max)
}

/// Run one update to completion, routing failures and panics to `on_error`.
async fn handle_update(handler: Arc<SessionHandler>, update: Update) {
    let update_id = update.update_id;

    match AssertUnwindSafe(route(&handler, update)).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => handler.on_error(update_id, &e),
        Err(_) => handler.on_error(update_id, &"handler panicked"),
    }
}

/// Send an update to the matching handler entry point.
pub async fn route(handler: &SessionHandler, update: Update) -> Result<()> {
    if let Some(query) = update.callback_query {
        handler.on_choice(&query).await?;
        return Ok(());
    }

    let Some(message) = update.message else {
        return Ok(());
    };
    let Some(text) = message.text.as_deref() else {
        return Ok(());
    };
    let chat_id = message.chat.id;

    match Command::parse(text) {
        Some(Command::Start) => handler.on_start(chat_id).await,
        Some(Command::Help) => handler.on_help(chat_id).await,
        Some(Command::Play(query)) => handler.on_play(chat_id, &query).await.map(|_| ()),
        Some(Command::Unknown(name)) => {
            debug!(chat_id, "Ignoring unknown command {}", name);
            Ok(())
        }
        None => handler.on_plain_message(chat_id, text).await.map(|_| ()),
    }
}
