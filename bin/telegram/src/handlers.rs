//! Document and photo handlers: classify the message, run the exchange,
//! send the outcome.

use anyhow::Result;
use teloxide::payloads::{SendDocumentSetters, SendMessageSetters};
use teloxide::prelude::Requester;
use teloxide::types::{InputFile, Message, ReplyParameters};
use tracing::{debug, info};

use attheme_bot_core::{
    Attachment, ExchangeRequest, FileRef, Outcome, Reply, ReplyAttachment,
    execute, plan,
};

use crate::WallpaperBot;
use crate::download::TelegramFetcher;
use crate::heartbeat::upload_heartbeat;
use crate::texts;

/// Handles one document or photo message end to end.
pub async fn handle_message(bot: &WallpaperBot, message: &Message) -> Result<()> {
    let Some(request) = classify_message(message) else {
        debug!("message carries no handleable attachment, ignoring");
        return Ok(());
    };

    info!(chat = %message.chat.id, "processing exchange request");

    // The guard keeps the upload indicator alive and stops on every exit
    // path. It is released as soon as the outcome is computed.
    let heartbeat = upload_heartbeat(bot.bot.clone(), message.chat.id);
    let fetcher = TelegramFetcher::new(bot.bot.clone());
    let outcome = execute(&fetcher, plan(request)).await;
    drop(heartbeat);

    send_outcome(bot, message, outcome).await
}

/// Builds the engine's request from a Telegram message: the current
/// attachment (document, or the largest photo size) plus the reply target's
/// document, if any. Messages with neither attachment kind, and unnamed
/// documents, are ignored.
pub fn classify_message(message: &Message) -> Option<ExchangeRequest> {
    let attachment = if let Some(document) = message.document() {
        Attachment::Document {
            file: FileRef::new(document.file.id.clone()),
            file_name: document.file_name.clone()?,
        }
    } else if let Some(sizes) = message.photo() {
        let largest = sizes.iter().max_by_key(|size| size.width * size.height)?;
        Attachment::Photo {
            file: FileRef::new(largest.file.id.clone()),
        }
    } else {
        return None;
    };

    let reply = message
        .reply_to_message()
        .map(|target| match target.document() {
            Some(document) => match &document.file_name {
                Some(file_name) => ReplyAttachment::Document {
                    file: FileRef::new(document.file.id.clone()),
                    file_name: file_name.clone(),
                },
                None => ReplyAttachment::Other,
            },
            None => ReplyAttachment::Other,
        });

    Some(ExchangeRequest { attachment, reply })
}

/// Renders an outcome back into the chat: the warning text first when
/// present, then the text reply or the document with its caption.
async fn send_outcome(
    bot: &WallpaperBot,
    message: &Message,
    outcome: Outcome,
) -> Result<()> {
    if let Some(warning) = outcome.warning {
        bot.bot
            .send_message(message.chat.id, texts::notice_text(warning))
            .reply_parameters(ReplyParameters::new(message.id))
            .await?;
    }

    match outcome.reply {
        Reply::Text(notice) => {
            bot.bot
                .send_message(message.chat.id, texts::notice_text(notice))
                .reply_parameters(ReplyParameters::new(message.id))
                .await?;
        }
        Reply::Document {
            file_name,
            bytes,
            caption,
        } => {
            let document = InputFile::memory(bytes).file_name(file_name);
            bot.bot
                .send_document(message.chat.id, document)
                .caption(texts::caption_text(caption))
                .reply_parameters(ReplyParameters::new(message.id))
                .await?;
        }
    }

    Ok(())
}
