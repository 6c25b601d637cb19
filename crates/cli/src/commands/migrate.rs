//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! workshop-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `WORKSHOP_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/workshop/migrations/`. The session table is
//! created by the session store itself.

use thiserror::Error;

use santas_workshop::middleware::session::{SessionStoreError, migrate_store, postgres_store};

use super::{CommandError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Session store error: {0}")]
    SessionStore(#[from] SessionStoreError),
}

/// Run the workshop migrations and create the session table.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running workshop migrations...");
    sqlx::migrate!("../workshop/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    let store = postgres_store(&pool)?;
    migrate_store(&store).await?;

    tracing::info!("Workshop migrations complete!");
    Ok(())
}
