//! Popeyón CLI - database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create the documents table and change trigger
//! popeyon-cli migrate
//!
//! # Load products and orders into the configured tenant
//! popeyon-cli seed data/seed.yaml
//!
//! # Replace everything in the tenant's collections
//! popeyon-cli seed data/seed.yaml --clear
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "popeyon-cli")]
#[command(author, version, about = "Popeyón CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run document store migrations
    Migrate,
    /// Seed products and orders from a YAML file
    Seed {
        /// Path to the YAML file
        file: String,

        /// Delete existing products and orders first
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, clear } => {
            commands::seed::run(&file, clear).await?;
        }
    }
    Ok(())
}
