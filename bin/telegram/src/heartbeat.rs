//! Upload-status heartbeat.
//!
//! Telegram's chat-action indicator expires after a few seconds, so it has to
//! be refreshed while an exchange is in flight. The guard refreshes it on a
//! fixed interval from a spawned task and aborts that task on drop, which
//! guarantees exactly one stop per request on every exit path.

use std::future::Future;
use std::time::Duration;

use teloxide::Bot;
use teloxide::prelude::Requester;
use teloxide::types::{ChatAction, ChatId};
use tokio::task::JoinHandle;
use tracing::debug;

/// Interval between chat-action refreshes.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(4);

/// A periodic action that stops when the guard is dropped.
pub struct Heartbeat {
    task: JoinHandle<()>,
}

impl Heartbeat {
    /// Runs `action` immediately and then once per `interval` until the
    /// returned guard is dropped.
    pub fn spawn<A, F>(interval: Duration, mut action: A) -> Self
    where
        A: FnMut() -> F + Send + 'static,
        F: Future<Output = ()> + Send,
    {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                action().await;
            }
        });

        Self { task }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Heartbeat that keeps the "uploading a document" indicator alive for a
/// chat.
pub fn upload_heartbeat(bot: Bot, chat_id: ChatId) -> Heartbeat {
    Heartbeat::spawn(HEARTBEAT_INTERVAL, move || {
        let bot = bot.clone();
        async move {
            if let Err(error) = bot
                .send_chat_action(chat_id, ChatAction::UploadDocument)
                .await
            {
                debug!(%error, "chat action refresh failed");
            }
        }
    })
}
