//! Toy catalogue repository.

use tracing::instrument;

use santas_workshop_core::ToyId;

use super::StoreError;
use super::document::{DocumentStore, FieldOp, decode_all, to_fields};
use crate::models::{NewToy, Toy, ToyPatch};

/// Repository for the `toys` collection.
pub struct ToyRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ToyRepository<'a> {
    pub const COLLECTION: &'static str = "toys";

    /// Create a new toy repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// List every toy, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Fetch` if the store cannot be read.
    /// Returns `StoreError::DataCorruption` if a document is malformed.
    pub async fn get_all(&self) -> Result<Vec<Toy>, StoreError> {
        let docs = self
            .store
            .list(Self::COLLECTION)
            .await
            .map_err(StoreError::fetch(Self::COLLECTION))?;
        decode_all(docs, Self::COLLECTION)
    }

    /// Get a toy by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no toy has this id.
    /// Returns `StoreError::Fetch` if the store cannot be read.
    pub async fn get_by_id(&self, id: &ToyId) -> Result<Toy, StoreError> {
        self.store
            .get(Self::COLLECTION, id.as_str())
            .await
            .map_err(StoreError::fetch(Self::COLLECTION))?
            .ok_or_else(|| StoreError::not_found(Self::COLLECTION, id.as_str()))?
            .decode(Self::COLLECTION)
    }

    /// Add a toy. `inStock` defaults to `true`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the store rejects the write.
    #[instrument(skip(self, toy), fields(toy_name = %toy.name))]
    pub async fn create(&self, toy: NewToy) -> Result<Toy, StoreError> {
        let toy = NewToy {
            in_stock: Some(toy.in_stock.unwrap_or(true)),
            ..toy
        };
        let fields = to_fields(&toy).map_err(StoreError::write(Self::COLLECTION))?;
        let doc = self
            .store
            .add(Self::COLLECTION, fields, None)
            .await
            .map_err(StoreError::write(Self::COLLECTION))?;
        tracing::info!(toy_id = %doc.id, "Toy created");
        doc.decode(Self::COLLECTION)
    }

    /// Merge the set fields of `patch` into a toy.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no toy has this id.
    /// Returns `StoreError::Write` if the store rejects the write.
    #[instrument(skip(self, patch), fields(toy_id = %id))]
    pub async fn update(&self, id: &ToyId, patch: ToyPatch) -> Result<Toy, StoreError> {
        let fields = to_fields(&patch).map_err(StoreError::write(Self::COLLECTION))?;
        self.store
            .merge(Self::COLLECTION, id.as_str(), fields)
            .await
            .map_err(StoreError::write(Self::COLLECTION))?
            .ok_or_else(|| StoreError::not_found(Self::COLLECTION, id.as_str()))?
            .decode(Self::COLLECTION)
    }

    /// Remove a toy.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no toy has this id.
    /// Returns `StoreError::Write` if the store rejects the delete.
    #[instrument(skip(self), fields(toy_id = %id))]
    pub async fn delete(&self, id: &ToyId) -> Result<(), StoreError> {
        let existed = self
            .store
            .delete(Self::COLLECTION, id.as_str())
            .await
            .map_err(StoreError::write(Self::COLLECTION))?;
        if !existed {
            return Err(StoreError::not_found(Self::COLLECTION, id.as_str()));
        }
        tracing::info!("Toy deleted");
        Ok(())
    }

    /// Flip `inStock` in a single store operation and return the result.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no toy has this id.
    /// Returns `StoreError::Write` if the store rejects the write.
    #[instrument(skip(self), fields(toy_id = %id))]
    pub async fn toggle_stock(&self, id: &ToyId) -> Result<Toy, StoreError> {
        let op = FieldOp::Negate {
            field: "inStock",
            default: true,
        };
        let toy: Toy = self
            .store
            .apply(Self::COLLECTION, id.as_str(), op)
            .await
            .map_err(StoreError::write(Self::COLLECTION))?
            .ok_or_else(|| StoreError::not_found(Self::COLLECTION, id.as_str()))?
            .decode(Self::COLLECTION)?;
        tracing::info!(in_stock = toy.in_stock, "Toy stock toggled");
        Ok(toy)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use santas_workshop_core::Difficulty;

    use super::*;
    use crate::db::MemoryDocumentStore;

    fn robot() -> NewToy {
        NewToy {
            name: "Robot".to_string(),
            category: "Tech".to_string(),
            difficulty: Difficulty::Medium,
            in_stock: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let store = MemoryDocumentStore::new();
        let repo = ToyRepository::new(&store);

        let created = repo.create(robot()).await.unwrap();
        assert!(created.in_stock);
        assert!(!created.id.is_blank());

        let fetched = repo.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_keeps_explicit_out_of_stock() {
        let store = MemoryDocumentStore::new();
        let repo = ToyRepository::new(&store);
        let toy = repo
            .create(NewToy {
                in_stock: Some(false),
                ..robot()
            })
            .await
            .unwrap();
        assert!(!toy.in_stock);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores() {
        let store = MemoryDocumentStore::new();
        let repo = ToyRepository::new(&store);
        let toy = repo.create(robot()).await.unwrap();

        assert!(!repo.toggle_stock(&toy.id).await.unwrap().in_stock);
        assert!(repo.toggle_stock(&toy.id).await.unwrap().in_stock);
    }

    #[tokio::test]
    async fn test_update_merges_partial_patch() {
        let store = MemoryDocumentStore::new();
        let repo = ToyRepository::new(&store);
        let toy = repo.create(robot()).await.unwrap();

        let updated = repo
            .update(
                &toy.id,
                ToyPatch {
                    difficulty: Some(Difficulty::Hard),
                    ..ToyPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.difficulty, Difficulty::Hard);
        assert_eq!(updated.name, "Robot");
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let store = MemoryDocumentStore::new();
        let repo = ToyRepository::new(&store);
        let missing = ToyId::new("missing");

        assert!(repo.get_by_id(&missing).await.unwrap_err().is_not_found());
        assert!(repo.toggle_stock(&missing).await.unwrap_err().is_not_found());
        assert!(
            repo.update(&missing, ToyPatch::default())
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let store = MemoryDocumentStore::new();
        let repo = ToyRepository::new(&store);
        let toy = repo.create(robot()).await.unwrap();

        repo.delete(&toy.id).await.unwrap();
        assert!(repo.get_by_id(&toy.id).await.unwrap_err().is_not_found());
        assert!(repo.delete(&toy.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_transport_failures_are_tagged() {
        let store = MemoryDocumentStore::new();
        let repo = ToyRepository::new(&store);

        store.set_simulate_read_error(true);
        assert!(matches!(
            repo.get_all().await.unwrap_err(),
            StoreError::Fetch { collection: "toys", .. }
        ));

        store.set_simulate_write_error(true);
        assert!(matches!(
            repo.create(robot()).await.unwrap_err(),
            StoreError::Write { collection: "toys", .. }
        ));
    }
}
