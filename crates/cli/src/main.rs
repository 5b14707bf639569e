//! gymbot CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Create the config file and data directory
//! - `run`: Serve the Telegram bot
//! - `chat`: Talk to the bot from the terminal
//! - `show`: Print a user's stored schedule
//! - `status`: Show configuration status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gymbot",
    about = "gymbot: weekly workout schedule bot",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and data directory
    Onboard,

    /// Start the Telegram bot (long polling)
    Run,

    /// Chat with the bot in the terminal
    Chat {
        /// User id to act as (defaults to `cli.user_id` from config)
        #[arg(short, long)]
        user: Option<i64>,

        /// Keep the schedule in memory only
        #[arg(long)]
        ephemeral: bool,
    },

    /// Print the stored schedule of a user
    Show {
        /// User id whose schedule to print (defaults to `cli.user_id`)
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Run => commands::serve::run().await?,
        Commands::Chat { user, ephemeral } => commands::chat::run(user, ephemeral).await?,
        Commands::Show { user } => commands::show::run(user).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
