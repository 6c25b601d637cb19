//! Theme preference stored in the visitor's session.

use santas_workshop_core::Theme;

use super::storage::{StorageError, TransientStorage};
use crate::models::session::keys;

/// The visitor's theme. Missing or unrecognized values read as light.
///
/// # Errors
///
/// Returns `StorageError` if the storage cannot be read.
pub async fn get<S>(storage: &S) -> Result<Theme, StorageError>
where
    S: TransientStorage + ?Sized,
{
    let stored = storage.get_value(keys::THEME).await?;
    Ok(stored
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default())
}

/// Store the visitor's theme.
///
/// # Errors
///
/// Returns `StorageError` if the storage cannot be written.
pub async fn set<S>(storage: &S, theme: Theme) -> Result<Theme, StorageError>
where
    S: TransientStorage + ?Sized,
{
    super::storage::insert(storage, keys::THEME, &theme).await?;
    Ok(theme)
}

/// Switch between light and dark, returning the new theme.
///
/// # Errors
///
/// Returns `StorageError` if the storage cannot be read or written.
pub async fn toggle<S>(storage: &S) -> Result<Theme, StorageError>
where
    S: TransientStorage + ?Sized,
{
    let next = get(storage).await?.toggled();
    set(storage, next).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::services::storage::MemoryStorage;

    #[tokio::test]
    async fn test_defaults_to_light() {
        let storage = MemoryStorage::new();
        assert_eq!(get(&storage).await.unwrap(), Theme::Light);
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(toggle(&storage).await.unwrap(), Theme::Dark);
        assert_eq!(get(&storage).await.unwrap(), Theme::Dark);
        assert_eq!(toggle(&storage).await.unwrap(), Theme::Light);
    }

    #[tokio::test]
    async fn test_invalid_stored_value_reads_as_light() {
        let storage = MemoryStorage::new();
        storage.insert_value(keys::THEME, json!("sepia")).await.unwrap();
        assert_eq!(get(&storage).await.unwrap(), Theme::Light);
        storage.insert_value(keys::THEME, json!(3)).await.unwrap();
        assert_eq!(get(&storage).await.unwrap(), Theme::Light);
    }
}
