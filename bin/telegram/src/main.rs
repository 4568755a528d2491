use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod commands;
mod config;
mod download;
mod handlers;
mod heartbeat;
mod texts;

use bot::WallpaperBot;
use config::BotConfig;


#[derive(Parser)]
#[command(name = "telegram")]
#[command(about = "Telegram bot that exchanges wallpapers with .attheme files")]
struct Cli {
    /// Path to bot config TOML (overrides BOT_CONFIG_PATH)
    #[arg(long)]
    bot_config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load config from TOML when a path is given, otherwise from env
    let config_path = cli
        .bot_config
        .or_else(|| std::env::var("BOT_CONFIG_PATH").ok());
    let config = match config_path {
        Some(path) => BotConfig::from_path(&path)?,
        None => BotConfig::from_env()?,
    };

    let bot = WallpaperBot::new(config);
    bot.run().await
}
