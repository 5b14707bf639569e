//! `gymbot status`: Show configuration status.

use gymbot_config::AppConfig;
use gymbot_store::FileStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = FileStore::new(config.data_dir());

    println!("🏋️ gymbot Status");
    println!("================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Data dir:     {}", store.dir().display());
    println!("  Weight unit:  {}", config.weight_unit);
    println!("  Bot token:    {}", if config.has_bot_token() { "set" } else { "missing" });
    println!("  Allowed:      {}", config.telegram.allowed_users.join(", "));
    println!("  Poll timeout: {}s", config.telegram.poll_timeout_secs);
    println!("  API base:     {}", config.telegram.api_base);

    match store.stored_users().await {
        Ok(users) => println!("  Schedules:    {}", users.len()),
        Err(e) => println!("  Schedules:    unreadable ({e})"),
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file: run `gymbot onboard` first");
    }

    Ok(())
}
