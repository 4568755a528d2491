use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info};

use crate::{commands::handle_command, config::BotConfig, handlers::handle_message};

pub struct WallpaperBot {
    pub bot: Bot,
    pub config: BotConfig,
}

impl WallpaperBot {
    pub fn new(config: BotConfig) -> Self {
        let bot = Bot::new(config.bot_token.clone());
        Self { bot, config }
    }

    /// Run the Telegram bot with long-polling.
    pub async fn run(self) -> Result<()> {
        info!("Starting wallpaper bot...");

        let bot = Arc::new(self);

        let handler = dptree::entry().branch(Update::filter_message().endpoint(
            |msg: Message, bot_ref: Arc<WallpaperBot>| async move {
                // First try to handle as a command
                match handle_command(&bot_ref, &msg).await {
                    Ok(true) => {
                        // Command was handled
                        return respond(());
                    }
                    Ok(false) => {
                        // Not a command, continue to normal handling
                    }
                    Err(e) => {
                        error!("Error handling command: {}", e);
                        return respond(());
                    }
                }

                // Handle as a document/photo exchange
                if let Err(e) = handle_message(&bot_ref, &msg).await {
                    error!("Error handling message: {}", e);
                }
                respond(())
            },
        ));

        // Build and run dispatcher with long-polling
        Dispatcher::builder(bot.bot.clone(), handler)
            .dependencies(dptree::deps![bot.clone()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Wallpaper bot stopped");
        Ok(())
    }
}
