//! Santa's Workshop CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the document and session tables
//! workshop-cli migrate
//!
//! # Promote a user to admin
//! workshop-cli role set 3f2c9a61d0b84c1e9a7f5e2d4b6c8a10 admin
//!
//! # Load sample toys, elves and orders, plus an admin account
//! workshop-cli seed --admin-email santa@northpole.org --admin-password hohoho
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `role set` - Change a user's role
//! - `seed` - Seed the store with sample records

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "workshop-cli")]
#[command(author, version, about = "Santa's Workshop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user roles
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
    /// Seed the store with sample records
    Seed {
        /// Email of an admin account to create
        #[arg(long, requires = "admin_password")]
        admin_email: Option<String>,

        /// Password of the admin account
        #[arg(long, requires = "admin_email")]
        admin_password: Option<String>,
    },
}

#[derive(Subcommand)]
enum RoleAction {
    /// Set a user's role
    Set {
        /// User id (the identity record id)
        user_id: String,

        /// Role (`user` or `admin`)
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env first so RUST_LOG applies
    let _ = dotenvy::dotenv();
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
        Commands::Role { action } => match action {
            RoleAction::Set { user_id, role } => {
                commands::role::set(&user_id, &role).await?;
            }
        },
        Commands::Seed {
            admin_email,
            admin_password,
        } => {
            let admin = admin_email.zip(admin_password);
            commands::seed::run(admin.as_ref().map(|(e, p)| (e.as_str(), p.as_str()))).await?;
        }
    }
    Ok(())
}
