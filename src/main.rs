use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use voyagemart::commands;
use voyagemart::config::Config;
use voyagemart::logging;

#[derive(Parser)]
#[command(name = "voyagemart")]
#[command(version)]
#[command(about = "Set sail for endless shopping adventures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List stores, optionally filtered by name or product
    Stores { query: Option<String> },
    /// Show your profile
    Profile,
    /// Send one message to a store and print the conversation
    Send {
        /// Store id or name (required to send)
        #[arg(short, long)]
        store: Option<String>,
        /// Image to attach (repeatable)
        #[arg(short, long = "image")]
        images: Vec<PathBuf>,
        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,
        /// Message text
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    logging::init_logging(&config.log_path())?;

    match cli.command {
        None => voyagemart::ui::run(config).await,
        Some(Commands::Stores { query }) => commands::list_stores(query.as_deref()),
        Some(Commands::Profile) => commands::show_profile(),
        Some(Commands::Send {
            store,
            images,
            json,
            text,
        }) => commands::send_message(&config, store.as_deref(), images, &text.join(" "), json).await,
    }
}
