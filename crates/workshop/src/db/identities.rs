//! Credential storage for the local identity provider.

use serde::Serialize;
use serde_json::Value;

use santas_workshop_core::{Email, UserId};

use super::StoreError;
use super::document::{DocumentStore, to_fields};
use crate::models::Identity;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentityFields<'a> {
    email: &'a Email,
    password_hash: &'a str,
}

/// Repository for the `identities` collection.
pub struct IdentityRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> IdentityRepository<'a> {
    pub const COLLECTION: &'static str = "identities";

    /// Create a new identity repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Find the identity registered under `email`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Fetch` if the store cannot be read.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, StoreError> {
        let docs = self
            .store
            .find_by(Self::COLLECTION, "email", &Value::from(email.as_str()))
            .await
            .map_err(StoreError::fetch(Self::COLLECTION))?;
        docs.into_iter()
            .next()
            .map(|doc| doc.decode(Self::COLLECTION))
            .transpose()
    }

    /// Store a new identity and return its user id.
    ///
    /// Uniqueness of `email` is checked by the caller; the `PostgreSQL`
    /// backend also enforces it with a unique index.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the store rejects the write.
    pub async fn create(&self, email: &Email, password_hash: &str) -> Result<Identity, StoreError> {
        let fields = to_fields(&IdentityFields {
            email,
            password_hash,
        })
        .map_err(StoreError::write(Self::COLLECTION))?;
        let doc = self
            .store
            .add(Self::COLLECTION, fields, Some("createdAt"))
            .await
            .map_err(StoreError::write(Self::COLLECTION))?;
        tracing::info!(user_id = %doc.id, "Identity registered");
        doc.decode(Self::COLLECTION)
    }

    /// Look up an identity by user id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Fetch` if the store cannot be read.
    pub async fn get(&self, id: &UserId) -> Result<Option<Identity>, StoreError> {
        self.store
            .get(Self::COLLECTION, id.as_str())
            .await
            .map_err(StoreError::fetch(Self::COLLECTION))?
            .map(|doc| doc.decode(Self::COLLECTION))
            .transpose()
    }
}
