use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod infrastructure;
mod services;

use cli::{Cli, Commands, ConnectionCommands};
use commands::{connection, refresh_credentials, run, scrape};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false) // Disable ANSI escape codes for cleaner output
        .init();

    match cli.command {
        Commands::Run {
            config,
            schedule,
            skip_refresh,
        } => {
            run::execute(config, schedule, skip_refresh).await?;
        }
        Commands::RefreshCredentials { config } => {
            refresh_credentials::execute(config).await?;
        }
        Commands::Scrape { config } => {
            scrape::execute(config).await?;
        }
        Commands::Connection { command } => match command {
            ConnectionCommands::Show { config } => {
                connection::show(config)?;
            }
            ConnectionCommands::Clear { config } => {
                connection::clear(config)?;
            }
        },
    }

    Ok(())
}
