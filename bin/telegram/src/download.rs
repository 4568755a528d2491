//! Telegram-backed file fetching for the exchange engine.

use std::io::Cursor;

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::Requester;
use teloxide::Bot;
use tracing::debug;

use attheme_bot_core::{ExchangeError, ExchangeResult, FileFetcher, FileRef};

/// Resolves a file id through `getFile` and downloads the bytes from the
/// token-scoped file endpoint, fully into memory.
pub struct TelegramFetcher {
    bot: Bot,
}

impl TelegramFetcher {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl FileFetcher for TelegramFetcher {
    async fn fetch(&self, file: &FileRef) -> ExchangeResult<Vec<u8>> {
        let file = self
            .bot
            .get_file(file.0.clone())
            .await
            .map_err(|error| ExchangeError::Fetch(error.to_string()))?;

        let mut buffer = Cursor::new(Vec::new());
        self.bot
            .download_file(&file.path, &mut buffer)
            .await
            .map_err(|error| ExchangeError::Fetch(error.to_string()))?;

        let bytes = buffer.into_inner();
        debug!(path = %file.path, size = bytes.len(), "downloaded file");
        Ok(bytes)
    }
}
