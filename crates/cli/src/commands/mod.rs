//! CLI subcommands.

pub mod migrate;
pub mod role;
pub mod seed;

use santas_workshop::config::{ConfigError, WorkshopConfig};
use santas_workshop::db;
use sqlx::PgPool;

/// Connect to the database named by the workshop configuration.
async fn connect() -> Result<PgPool, CommandError> {
    let config = WorkshopConfig::from_env()?;
    let database_url = config.require_database_url()?;

    tracing::info!("Connecting to workshop database...");
    Ok(db::create_pool(database_url).await?)
}

/// Errors shared by the database-backed commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
