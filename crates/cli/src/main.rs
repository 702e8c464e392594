//! Kestrel CLI - database migrations, admin accounts and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations/ to DATABASE_URL
//! kestrel migrate
//!
//! # Bootstrap the first CMS account
//! kestrel admin create -e ops@kestrel-switchgear.com -n "Operations" -p 'correct horse battery'
//!
//! # Forgotten password
//! kestrel admin reset-password -e ops@kestrel-switchgear.com -p 'new long password'
//!
//! # Load categories, products and certifications
//! kestrel seed catalog -f seed/catalog.yaml
//! ```
//!
//! Every command reads `DATABASE_URL`, from the environment or a `.env` file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(author, version, about = "Kestrel Switchgear CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage CMS administrators
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Load data from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new administrator
    Create {
        /// Email address used to sign in
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long)]
        password: String,
    },
    /// Set a new password for an existing user
    ResetPassword {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert categories, products and certifications from a YAML file
    Catalog {
        /// Path to the YAML file
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kestrel_cli=info,kestrel_core=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
            AdminAction::ResetPassword { email, password } => {
                commands::admin::reset_password(&email, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => {
                commands::seed::catalog(&file).await?;
            }
        },
    }
    Ok(())
}
