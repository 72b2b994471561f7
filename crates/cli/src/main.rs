//! Gebeya CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (marketplace tables and sessions)
//! gebeya-cli migrate
//!
//! # Load demo categories, a vendor, products, reviews and an article
//! gebeya-cli seed --vendor-password 'choose-a-password'
//!
//! # Create an account with a role
//! gebeya-cli user create -u almaz -e almaz@example.com -p 'secret-pass' -r admin
//!
//! # Mark a vendor as verified (or remove the badge)
//! gebeya-cli vendor verify vendor1
//! gebeya-cli vendor verify vendor1 --revoke
//! ```
//!
//! # Environment Variables
//!
//! - `GEBEYA_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gebeya-cli")]
#[command(author, version, about = "Gebeya marketplace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo data (safe to run twice)
    Seed {
        /// Password for the demo vendor account `vendor1`
        #[arg(long)]
        vendor_password: String,
    },
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage vendors
    Vendor {
        #[command(subcommand)]
        action: VendorAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Role (`customer`, `seller`, `admin`)
        #[arg(short, long, default_value = "customer")]
        role: String,

        /// First name
        #[arg(long, default_value = "")]
        first_name: String,

        /// Last name
        #[arg(long, default_value = "")]
        last_name: String,
    },
}

#[derive(Subcommand)]
enum VendorAction {
    /// Set the verified badge on a vendor, by the owner's username
    Verify {
        username: String,

        /// Remove the badge instead
        #[arg(long)]
        revoke: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { vendor_password } => commands::seed::run(&vendor_password).await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
                role,
                first_name,
                last_name,
            } => {
                commands::users::create(commands::users::NewAccount {
                    username,
                    email,
                    password,
                    role,
                    first_name,
                    last_name,
                })
                .await?;
            }
        },
        Commands::Vendor { action } => match action {
            VendorAction::Verify { username, revoke } => {
                commands::vendors::verify(&username, !revoke).await?;
            }
        },
    }
    Ok(())
}
