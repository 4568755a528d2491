//! Slash command handlers.

use anyhow::Result;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Requester;
use teloxide::types::{Message, ParseMode};

use crate::WallpaperBot;
use crate::texts;

/// Check if a message is a command and return the command name and args.
pub fn parse_command(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with('/') {
        return None;
    }

    let text = text.trim();
    let mut parts = text.splitn(2, |c: char| c.is_whitespace());
    let cmd = parts.next()?.trim_start_matches('/');
    let args = parts.next().unwrap_or("").trim();

    // Remove @botname suffix if present
    let cmd = cmd.split('@').next()?;

    Some((cmd, args))
}

/// Handle /start and /help. Returns `true` when the message was a command.
pub async fn handle_command(bot: &WallpaperBot, message: &Message) -> Result<bool> {
    let Some(text) = message.text() else {
        return Ok(false);
    };
    let Some((command, _args)) = parse_command(text) else {
        return Ok(false);
    };

    match command {
        "start" => {
            bot.bot
                .send_message(message.chat.id, texts::start_message())
                .await?;
            Ok(true)
        }
        "help" => {
            bot.bot
                .send_message(message.chat.id, texts::help_message())
                .parse_mode(ParseMode::Markdown)
                .await?;
            Ok(true)
        }
        _ => Ok(false),
    }
}
