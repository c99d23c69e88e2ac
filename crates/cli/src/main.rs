//! BlackLake CLI - Contact form client and deployment checks.
//!
//! # Usage
//!
//! ```bash
//! # Fill in the contact form interactively and submit it
//! bl-cli contact --endpoint http://localhost:3000/api/contact
//!
//! # Scripted submission (waits out the minimum fill time before posting)
//! bl-cli contact -n "Jane" -e jane@example.com -s "Billing" -p "Latency"
//!
//! # Verify production environment variables before deploying
//! bl-cli check-env
//! ```
//!
//! # Commands
//!
//! - `contact` - Submit the contact form
//! - `check-env` - Run the environment guard in production mode

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bl-cli")]
#[command(author, version, about = "BlackLake site tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit the contact form
    Contact(commands::contact::ContactArgs),
    /// Check that every production environment variable is set
    CheckEnv,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bl_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Contact(args) => commands::contact::run(args).await?,
        Commands::CheckEnv => commands::env::check()?,
    }
    Ok(())
}
