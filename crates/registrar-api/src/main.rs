//! Registrar CLI entry point.
//!
//! Binary name: `registrar`
//!
//! Parses CLI arguments, opens the records database, wires the dialogue
//! manager and dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,registrar=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    match cli.command {
        // Listing the lexicon needs no database
        Commands::Intents => {
            cli::intents::list_intents(cli.json)?;
        }

        Commands::Ask {
            message,
            user,
            role,
        } => {
            let state = AppState::init().await?;
            cli::ask::ask(&state, &message, &user, role, cli.json).await?;
        }

        Commands::Chat { user, role } => {
            let state = AppState::init().await?;
            cli::chat::loop_runner::run_chat_loop(&state, &user, role, cli.json).await?;
        }
    }

    Ok(())
}
