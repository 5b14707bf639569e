//! `gymbot show`: Print a stored schedule without starting a chat.

use gymbot_config::AppConfig;
use gymbot_conversation::Formatter;
use gymbot_core::schedule::UserId;
use gymbot_core::store::ScheduleStore;
use gymbot_store::FileStore;

pub async fn run(user: Option<i64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let user = UserId(user.unwrap_or(config.cli.user_id));

    let store = FileStore::new(config.data_dir());
    let schedule = store.load(user).await?;
    let formatter = Formatter::new(config.weight_unit.clone());

    println!("{}", formatter.format_schedule(&schedule));
    println!(
        "\n  {} exercise(s) on {} day(s), stored in {}",
        schedule.exercise_count(),
        schedule.weekdays().len(),
        store.user_file(user).display()
    );
    Ok(())
}
