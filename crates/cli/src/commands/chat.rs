//! `gymbot chat`: Terminal conversation with the bot.

use std::sync::Arc;

use gymbot_channels::CliChannel;
use gymbot_channels::cli::render;
use gymbot_config::AppConfig;
use gymbot_conversation::{Command, Dispatcher, Formatter, Input, SessionController};
use gymbot_core::schedule::UserId;
use gymbot_core::store::ScheduleStore;
use gymbot_store::{FileStore, InMemoryStore};

pub async fn run(user: Option<i64>, ephemeral: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let user = UserId(user.unwrap_or(config.cli.user_id));

    let store: Arc<dyn ScheduleStore> = if ephemeral {
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(FileStore::new(config.data_dir()))
    };

    println!("🏋️ gymbot: terminal chat as user {user}");
    println!("   Storage: {}", store.name());
    println!("   Type a button label or a /command; /back leaves a flow.");
    println!("   Ctrl+D or /quit to exit.\n");

    let controller = Arc::new(SessionController::new(
        store,
        Formatter::new(config.weight_unit.clone()),
    ));

    let greeting = controller.handle(user, Input::Command(Command::Start)).await?;
    println!("{}\n", render(&greeting));

    Dispatcher::new(controller)
        .run(Arc::new(CliChannel::new(user)))
        .await?;

    println!("👋 Bye!");
    Ok(())
}
