//! Session middleware configuration.
//!
//! Sessions hold the signed-in identity, the anonymous visitor id and the
//! theme preference. They are `PostgreSQL`-backed when a database is
//! configured and kept in memory otherwise.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::WorkshopConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "workshop_session";

/// Session expiry time in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Errors preparing the session store.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("invalid session table name: {0}")]
    InvalidName(String),
    #[error("session table migration failed: {0}")]
    Migrate(#[from] sqlx::Error),
}

/// Create the `PostgreSQL` session store in the `workshop` schema.
///
/// # Errors
///
/// Returns `SessionStoreError::InvalidName` if the schema or table name is
/// rejected by the store.
pub fn postgres_store(pool: &PgPool) -> Result<PostgresStore, SessionStoreError> {
    PostgresStore::new(pool.clone())
        .with_schema_name("workshop")
        .and_then(|store| store.with_table_name("session"))
        .map_err(|e| SessionStoreError::InvalidName(e.to_string()))
}

/// Create the session table if it does not exist.
///
/// # Errors
///
/// Returns `SessionStoreError::Migrate` if the table cannot be created.
pub async fn migrate_store(store: &PostgresStore) -> Result<(), SessionStoreError> {
    store.migrate().await?;
    Ok(())
}

/// Create the session layer around any session store.
///
/// The cookie is `Secure` only when the console is served over HTTPS.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &WorkshopConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
