//! Roadcall CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! roadcall-cli migrate
//!
//! # Seed the service catalog
//! roadcall-cli seed
//!
//! # Grant or revoke staff flags on a customer
//! roadcall-cli staff set --id 7f3c9d54-2f41-4b77-9e1a-0db1f1b7a9c2 --administrator --technician
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the service catalog
//! - `staff set` - Set the administrator/technician flags on a customer

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "roadcall-cli")]
#[command(author, version, about = "Roadcall CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the service catalog
    Seed,
    /// Manage staff flags
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Set the staff flags on a customer (absent switches clear the flag)
    Set {
        /// Customer identity id
        #[arg(long)]
        id: Uuid,

        /// Grant the administrator flag
        #[arg(long)]
        administrator: bool,

        /// Grant the technician flag
        #[arg(long)]
        technician: bool,
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Staff { action } => match action {
            StaffAction::Set {
                id,
                administrator,
                technician,
            } => commands::staff::set_flags(id, administrator, technician).await?,
        },
    }
    Ok(())
}
