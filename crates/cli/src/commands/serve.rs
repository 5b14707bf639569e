//! `gymbot run`: Serve the bot over Telegram until Ctrl+C.

use std::sync::Arc;

use gymbot_channels::{TelegramChannel, TelegramConfig};
use gymbot_config::AppConfig;
use gymbot_conversation::{Dispatcher, Formatter, SessionController};
use gymbot_core::channel::Channel;
use gymbot_store::FileStore;
use tracing::info;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let telegram = TelegramConfig::from_settings(&config.telegram).ok_or(
        "No bot token configured. Set telegram.bot_token in config.toml or BOT_TOKEN.",
    )?;

    let store = Arc::new(FileStore::new(config.data_dir()));
    let controller = Arc::new(SessionController::new(
        store,
        Formatter::new(config.weight_unit.clone()),
    ));
    let dispatcher = Dispatcher::new(controller);
    let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::new(telegram)?);

    info!(data_dir = %config.data_dir().display(), "Starting gymbot");

    let run = dispatcher.run(channel.clone());
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested, finishing in-flight messages");
            // Closing the channel ends the stream; `run` then drains its tasks
            channel.stop().await?;
            run.await?;
        }
    }

    Ok(())
}
