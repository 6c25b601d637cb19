//! Record store access for the workshop.
//!
//! # Collections
//!
//! - `toys` - Toy catalogue
//! - `orders` - Children's orders, each tagged with exactly one owner
//! - `elves` - Workshop staff and their energy
//! - `users` - Role records keyed by user identity
//! - `identities` - Email/password credentials owned by the identity provider
//!
//! Every collection lives behind the [`DocumentStore`] trait. Two backends
//! exist: [`PgDocumentStore`] (one JSONB table, `workshop.document`) and
//! [`MemoryDocumentStore`] (process-local, used when no database is configured
//! and in tests).
//!
//! # Migrations
//!
//! Migrations are stored in `crates/workshop/migrations/` and run via:
//! ```bash
//! cargo run -p santas-workshop-cli -- migrate
//! ```

pub mod document;
pub mod elves;
pub mod identities;
pub mod memory;
pub mod orders;
pub mod postgres;
pub mod toys;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use document::{Document, DocumentStore, FieldOp, Fields};
pub use elves::ElfRepository;
pub use identities::IdentityRepository;
pub use memory::MemoryDocumentStore;
pub use orders::OrderRepository;
pub use postgres::PgDocumentStore;
pub use toys::ToyRepository;
pub use users::RoleRepository;

/// Failure inside a storage backend, before it is attributed to an operation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A document could not be encoded or decoded.
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The backend refused or could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the record repositories.
///
/// Every variant keeps the collection it concerns, and transport failures keep
/// their original cause so callers can tell a missing record from an outage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading from the store failed.
    #[error("failed to fetch {collection}: {source}")]
    Fetch {
        collection: &'static str,
        #[source]
        source: BackendError,
    },

    /// The requested record does not exist.
    #[error("{collection} record {id} not found")]
    NotFound { collection: &'static str, id: String },

    /// Creating, updating or deleting failed.
    #[error("failed to write {collection}: {source}")]
    Write {
        collection: &'static str,
        #[source]
        source: BackendError,
    },

    /// The caller is not allowed to perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A stored document does not match the record shape.
    #[error("data corruption in {collection}/{id}: {reason}")]
    DataCorruption {
        collection: &'static str,
        id: String,
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn fetch(collection: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| Self::Fetch { collection, source }
    }

    pub(crate) fn write(collection: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| Self::Write { collection, source }
    }

    pub(crate) fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Whether this error means the record is absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
