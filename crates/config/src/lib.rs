//! Configuration loading, validation, and management for gymbot.
//!
//! Loads configuration from `~/.gymbot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.gymbot/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding one `<user_id>.json` file per user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Unit suffix shown after weights in the schedule
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,

    /// Telegram bot settings
    #[serde(default)]
    pub telegram: TelegramSettings,

    /// Local terminal chat settings
    #[serde(default)]
    pub cli: CliSettings,
}

fn default_weight_unit() -> String {
    "kg".into()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    /// Bot token from @BotFather
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Allowlist of user IDs. Empty = deny all. ["*"] = allow all.
    #[serde(default = "default_allowed_users")]
    pub allowed_users: Vec<String>,

    /// Long-poll timeout passed to getUpdates
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Bot API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_allowed_users() -> Vec<String> {
    vec!["*".into()]
}
fn default_poll_timeout() -> u64 {
    30
}
fn default_api_base() -> String {
    "https://api.telegram.org".into()
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            allowed_users: default_allowed_users(),
            poll_timeout_secs: default_poll_timeout(),
            api_base: default_api_base(),
        }
    }
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &redact(&self.bot_token))
            .field("allowed_users", &self.allowed_users)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    /// User id the terminal chat acts as
    #[serde(default = "default_cli_user")]
    pub user_id: i64,
}

fn default_cli_user() -> i64 {
    1
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            user_id: default_cli_user(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.gymbot/config.toml).
    ///
    /// A `.env` file in the working directory is read first, then these
    /// environment variables override the file:
    /// - `GYMBOT_BOT_TOKEN` (highest priority), then `BOT_TOKEN`
    /// - `GYMBOT_DATA_DIR`
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is the normal case
        let _ = dotenvy::dotenv();

        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Some(token) = std::env::var("GYMBOT_BOT_TOKEN")
            .ok()
            .or_else(|| std::env::var("BOT_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
        {
            config.telegram.bot_token = Some(token);
        }

        if let Ok(dir) = std::env::var("GYMBOT_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".gymbot")
    }

    /// Directory for schedule files, honouring `data_dir` when set.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("user_data"))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=300).contains(&self.telegram.poll_timeout_secs) {
            return Err(ConfigError::ValidationError(
                "telegram.poll_timeout_secs must be between 1 and 300".into(),
            ));
        }

        if self.weight_unit.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "weight_unit must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if a bot token is available (from config or environment).
    pub fn has_bot_token(&self) -> bool {
        self.telegram.bot_token.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            weight_unit: default_weight_unit(),
            telegram: TelegramSettings::default(),
            cli: CliSettings::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {}: {reason}", path.display())]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {}: {reason}", path.display())]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
