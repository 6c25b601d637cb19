//! Role record repository.
//!
//! Role records live in `users/{user id}` and are created lazily the first
//! time a user signs in or registers.

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use santas_workshop_core::{Email, UserId, UserRole};

use super::StoreError;
use super::document::{DocumentStore, to_fields};
use crate::models::RoleRecord;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleFields<'a> {
    role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a Email>,
    created_at: chrono::DateTime<Utc>,
}

/// Repository for the `users` collection.
pub struct RoleRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> RoleRepository<'a> {
    pub const COLLECTION: &'static str = "users";

    /// Create a new role repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a user's role record, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Fetch` if the store cannot be read.
    /// Returns `StoreError::DataCorruption` if the record is malformed.
    pub async fn get(&self, id: &UserId) -> Result<Option<RoleRecord>, StoreError> {
        self.store
            .get(Self::COLLECTION, id.as_str())
            .await
            .map_err(StoreError::fetch(Self::COLLECTION))?
            .map(|doc| doc.decode(Self::COLLECTION))
            .transpose()
    }

    /// Create a role record with the given role, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the store rejects the write.
    #[instrument(skip(self, email), fields(user_id = %id))]
    pub async fn create(
        &self,
        id: &UserId,
        role: UserRole,
        email: Option<&Email>,
    ) -> Result<RoleRecord, StoreError> {
        let fields = to_fields(&RoleFields {
            role,
            email,
            created_at: Utc::now(),
        })
        .map_err(StoreError::write(Self::COLLECTION))?;
        let doc = self
            .store
            .set(Self::COLLECTION, id.as_str(), fields)
            .await
            .map_err(StoreError::write(Self::COLLECTION))?;
        tracing::info!(%role, "Role record created");
        doc.decode(Self::COLLECTION)
    }

    /// Get a user's role record, creating a `user` record if none exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the lookup or the create fails.
    pub async fn ensure(&self, id: &UserId, email: Option<&Email>) -> Result<RoleRecord, StoreError> {
        match self.get(id).await? {
            Some(record) => Ok(record),
            None => self.create(id, UserRole::User, email).await,
        }
    }

    /// Change a user's role, creating the record if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the store rejects the write.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn set_role(&self, id: &UserId, role: UserRole) -> Result<RoleRecord, StoreError> {
        let mut patch = serde_json::Map::new();
        patch.insert("role".to_owned(), serde_json::Value::from(role.to_string()));
        let merged = self
            .store
            .merge(Self::COLLECTION, id.as_str(), patch)
            .await
            .map_err(StoreError::write(Self::COLLECTION))?;
        match merged {
            Some(doc) => {
                tracing::info!(%role, "Role updated");
                doc.decode(Self::COLLECTION)
            }
            None => self.create(id, role, None).await,
        }
    }
}
