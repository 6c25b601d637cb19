//! User role management.
//!
//! # Usage
//!
//! ```bash
//! workshop-cli role set <user-id> admin
//! ```

use thiserror::Error;

use santas_workshop::db::{IdentityRepository, PgDocumentStore, RoleRepository, StoreError};
use santas_workshop_core::{ParseEnumError, UserId, UserRole};

use super::{CommandError, connect};

/// Errors that can occur during role operations.
#[derive(Debug, Error)]
pub enum RoleError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Invalid role: {0}. Valid roles: user, admin")]
    InvalidRole(#[from] ParseEnumError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Set a user's role, creating the role record if needed.
///
/// # Errors
///
/// Returns an error if the role is invalid or the store cannot be written.
pub async fn set(user_id: &str, role: &str) -> Result<(), RoleError> {
    let role: UserRole = role.parse()?;
    let user_id = UserId::new(user_id);

    let store = PgDocumentStore::new(connect().await?);
    if IdentityRepository::new(&store).get(&user_id).await?.is_none() {
        tracing::warn!(%user_id, "No identity with this id; the role applies once it signs in");
    }

    let record = RoleRepository::new(&store).set_role(&user_id, role).await?;
    tracing::info!(%user_id, role = %record.role, "Role updated");
    Ok(())
}
