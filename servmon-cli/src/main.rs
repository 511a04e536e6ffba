// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! servmon CLI
//!
//! Command-line interface and HTTP gateway for the server inventory.

use clap::{Parser, Subcommand};

mod commands;
mod gateway;
mod metrics;

/// servmon - Server inventory over a conditional-write key-value table
#[derive(Parser)]
#[command(name = "servmon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "servmon.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bootstrap the table and serve the HTTP gateway
    Up,

    /// Handle a single API event and print the response
    Invoke {
        /// Path to the event JSON file, or "-" for stdin
        event: String,
    },

    /// List servers stored in the configured table
    List,

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Up => commands::up::execute(&cli.config).await,
        Commands::Invoke { event } => commands::invoke::execute(&cli.config, &event).await,
        Commands::List => commands::list::execute(&cli.config).await,
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
