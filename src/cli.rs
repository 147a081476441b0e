//! CLI definitions for tsa-pipeline
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tsa-pipeline",
    version,
    about = "Pipeline orchestrator for the TSA checkpoint travel-numbers ETL",
    long_about = "Rotates short-lived ECR credentials and launches the containerized\nscraper that loads TSA checkpoint travel-volume data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: refresh credentials, then scrape
    Run {
        /// Path to YAML config file (defaults apply when omitted)
        #[arg(long, env = "TSA_PIPELINE_CONFIG")]
        config: Option<String>,

        /// Keep running, firing a pipeline run at every UTC midnight
        #[arg(long)]
        schedule: bool,

        /// Reuse the stored connection record instead of refreshing it
        #[arg(long)]
        skip_refresh: bool,
    },

    /// Rotate the ECR login stored in the connection record
    RefreshCredentials {
        /// Path to YAML config file
        #[arg(long, env = "TSA_PIPELINE_CONFIG")]
        config: Option<String>,
    },

    /// Pull and run the scraper container with stored credentials
    Scrape {
        /// Path to YAML config file
        #[arg(long, env = "TSA_PIPELINE_CONFIG")]
        config: Option<String>,
    },

    /// Inspect or clear the stored connection record
    Connection {
        #[command(subcommand)]
        command: ConnectionCommands,
    },
}

#[derive(Subcommand)]
pub enum ConnectionCommands {
    /// Print the stored record with the password masked
    Show {
        /// Path to YAML config file
        #[arg(long, env = "TSA_PIPELINE_CONFIG")]
        config: Option<String>,
    },

    /// Delete the stored record
    Clear {
        /// Path to YAML config file
        #[arg(long, env = "TSA_PIPELINE_CONFIG")]
        config: Option<String>,
    },
}
