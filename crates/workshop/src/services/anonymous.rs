//! Anonymous visitor session ids.
//!
//! Visitors who have not signed in get a lazily generated id of the form
//! `anon_<unix millis>_<9 base36 chars>`. Orders they place are tagged with
//! it, so they can see their own orders until the browser session ends. The
//! id is dropped when the visitor signs in.

use chrono::Utc;
use rand::Rng;

use santas_workshop_core::SessionId;

use super::storage::{self, StorageError, TransientStorage};
use crate::models::session::keys;

/// Prefix of every anonymous session id.
pub const PREFIX: &str = "anon_";

const SUFFIX_LEN: usize = 9;

/// Generate a fresh anonymous session id.
#[must_use]
pub fn generate() -> SessionId {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect();
    SessionId::new(format!(
        "{PREFIX}{}_{suffix}",
        Utc::now().timestamp_millis()
    ))
}

/// The visitor's anonymous session id, if one has been issued.
///
/// # Errors
///
/// Returns `StorageError` if the storage cannot be read.
pub async fn current<S>(storage: &S) -> Result<Option<SessionId>, StorageError>
where
    S: TransientStorage + ?Sized,
{
    storage::get(storage, keys::ANONYMOUS_SESSION_ID).await
}

/// The visitor's anonymous session id, issuing and storing one if needed.
///
/// # Errors
///
/// Returns `StorageError` if the storage cannot be read or written.
pub async fn get_or_create<S>(storage: &S) -> Result<SessionId, StorageError>
where
    S: TransientStorage + ?Sized,
{
    if let Some(existing) = current(storage).await? {
        return Ok(existing);
    }
    let id = generate();
    storage::insert(storage, keys::ANONYMOUS_SESSION_ID, &id).await?;
    tracing::debug!(session_id = %id, "Issued anonymous session id");
    Ok(id)
}

/// Forget the visitor's anonymous session id, returning it if one was set.
///
/// # Errors
///
/// Returns `StorageError` if the storage cannot be written.
pub async fn clear<S>(storage: &S) -> Result<Option<SessionId>, StorageError>
where
    S: TransientStorage + ?Sized,
{
    storage
        .remove_value(keys::ANONYMOUS_SESSION_ID)
        .await?
        .map(serde_json::from_value)
        .transpose()
        .map_err(Into::into)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStorage;

    #[test]
    fn test_generated_format() {
        let id = generate();
        let rest = id.as_str().strip_prefix(PREFIX).unwrap();
        let (millis, suffix) = rest.split_once('_').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(generate(), generate());
    }

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let storage = MemoryStorage::new();
        assert!(current(&storage).await.unwrap().is_none());

        let first = get_or_create(&storage).await.unwrap();
        let second = get_or_create(&storage).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_clear_then_new_id() {
        let storage = MemoryStorage::new();
        let first = get_or_create(&storage).await.unwrap();

        assert_eq!(clear(&storage).await.unwrap(), Some(first.clone()));
        assert!(current(&storage).await.unwrap().is_none());
        assert_eq!(clear(&storage).await.unwrap(), None);

        let second = get_or_create(&storage).await.unwrap();
        assert_ne!(first, second);
    }
}
