//! Transient per-visitor storage.
//!
//! The console keeps identity, the anonymous session id and the theme
//! preference in a storage that lives as long as the visitor's browser
//! session. In the server that is the `tower-sessions` session; tests use
//! [`MemoryStorage`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_sessions::Session;

/// Errors raised by a transient storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session layer failed to load or save.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A stored value could not be converted.
    #[error("malformed session value: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Key/value storage scoped to one visitor.
#[async_trait]
pub trait TransientStorage: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<Value>, StorageError>;

    async fn insert_value(&self, key: &str, value: Value) -> Result<(), StorageError>;

    async fn remove_value(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Issue a fresh session identifier, keeping the data. Called whenever
    /// the visitor's privileges change.
    async fn rotate(&self) -> Result<(), StorageError>;
}

#[async_trait]
impl TransientStorage for Session {
    async fn get_value(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(Self::get_value(self, key).await?)
    }

    async fn insert_value(&self, key: &str, value: Value) -> Result<(), StorageError> {
        Self::insert_value(self, key, value).await?;
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(Self::remove_value(self, key).await?)
    }

    async fn rotate(&self) -> Result<(), StorageError> {
        Ok(self.cycle_id().await?)
    }
}

/// In-memory storage for a single visitor.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransientStorage for MemoryStorage {
    async fn get_value(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn insert_value(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.values.lock().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.values.lock().await.remove(key))
    }

    async fn rotate(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Read and decode a typed value.
///
/// # Errors
///
/// Returns `StorageError` if the backend fails or the value has the wrong shape.
pub async fn get<T, S>(storage: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: TransientStorage + ?Sized,
{
    storage
        .get_value(key)
        .await?
        .map(serde_json::from_value)
        .transpose()
        .map_err(Into::into)
}

/// Encode and store a typed value.
///
/// # Errors
///
/// Returns `StorageError` if the value cannot be encoded or stored.
pub async fn insert<T, S>(storage: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + Sync + ?Sized,
    S: TransientStorage + ?Sized,
{
    storage.insert_value(key, serde_json::to_value(value)?).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_typed_round_trip() {
        let storage = MemoryStorage::new();
        insert(&storage, "count", &3_u32).await.unwrap();
        assert_eq!(get::<u32, _>(&storage, "count").await.unwrap(), Some(3));

        storage.remove_value("count").await.unwrap();
        assert_eq!(get::<u32, _>(&storage, "count").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_malformed() {
        let storage = MemoryStorage::new();
        insert(&storage, "count", "three").await.unwrap();
        assert!(matches!(
            get::<u32, _>(&storage, "count").await,
            Err(StorageError::Malformed(_))
        ));
    }
}
