//! Chat transports for gymbot.
//!
//! - **Telegram**: Bot API long polling with reply keyboards
//! - **CLI**: interactive terminal chat (stdin/stdout)

pub mod cli;
pub mod telegram;

pub use cli::CliChannel;
pub use telegram::{TelegramChannel, TelegramConfig};
