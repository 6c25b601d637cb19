//! Elf roster repository.

use tracing::instrument;

use santas_workshop_core::{ElfId, Energy};

use super::StoreError;
use super::document::{DocumentStore, FieldOp, decode_all, to_fields};
use crate::config::ElfBoostPolicy;
use crate::models::elf::ElfFields;
use crate::models::{Elf, ElfPatch, NewElf};

/// Repository for the `elves` collection.
pub struct ElfRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ElfRepository<'a> {
    pub const COLLECTION: &'static str = "elves";

    /// Create a new elf repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// List every elf, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Fetch` if the store cannot be read.
    /// Returns `StoreError::DataCorruption` if a document is malformed.
    pub async fn get_all(&self) -> Result<Vec<Elf>, StoreError> {
        let docs = self
            .store
            .list(Self::COLLECTION)
            .await
            .map_err(StoreError::fetch(Self::COLLECTION))?;
        decode_all(docs, Self::COLLECTION)
    }

    /// Get an elf by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no elf has this id.
    /// Returns `StoreError::Fetch` if the store cannot be read.
    pub async fn get_by_id(&self, id: &ElfId) -> Result<Elf, StoreError> {
        self.store
            .get(Self::COLLECTION, id.as_str())
            .await
            .map_err(StoreError::fetch(Self::COLLECTION))?
            .ok_or_else(|| StoreError::not_found(Self::COLLECTION, id.as_str()))?
            .decode(Self::COLLECTION)
    }

    /// Add an elf. Energy is clamped into range and defaults to 50.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the store rejects the write.
    #[instrument(skip(self, elf), fields(elf_name = %elf.name))]
    pub async fn create(&self, elf: NewElf) -> Result<Elf, StoreError> {
        let fields = to_fields(&ElfFields::from(elf)).map_err(StoreError::write(Self::COLLECTION))?;
        let doc = self
            .store
            .add(Self::COLLECTION, fields, None)
            .await
            .map_err(StoreError::write(Self::COLLECTION))?;
        tracing::info!(elf_id = %doc.id, "Elf created");
        doc.decode(Self::COLLECTION)
    }

    /// Merge the set fields of `patch` into an elf, clamping energy.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no elf has this id.
    /// Returns `StoreError::Write` if the store rejects the write.
    #[instrument(skip(self, patch), fields(elf_id = %id))]
    pub async fn update(&self, id: &ElfId, patch: ElfPatch) -> Result<Elf, StoreError> {
        let fields =
            to_fields(&ElfFields::from(patch)).map_err(StoreError::write(Self::COLLECTION))?;
        self.store
            .merge(Self::COLLECTION, id.as_str(), fields)
            .await
            .map_err(StoreError::write(Self::COLLECTION))?
            .ok_or_else(|| StoreError::not_found(Self::COLLECTION, id.as_str()))?
            .decode(Self::COLLECTION)
    }

    /// Remove an elf.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no elf has this id.
    /// Returns `StoreError::Write` if the store rejects the delete.
    #[instrument(skip(self), fields(elf_id = %id))]
    pub async fn delete(&self, id: &ElfId) -> Result<(), StoreError> {
        let existed = self
            .store
            .delete(Self::COLLECTION, id.as_str())
            .await
            .map_err(StoreError::write(Self::COLLECTION))?;
        if !existed {
            return Err(StoreError::not_found(Self::COLLECTION, id.as_str()));
        }
        tracing::info!("Elf deleted");
        Ok(())
    }

    /// Add one boost step to an elf's energy, capped at the maximum.
    ///
    /// With [`ElfBoostPolicy::Preview`] the stored elf is untouched and the
    /// boosted copy is returned; with [`ElfBoostPolicy::Persist`] the increment
    /// happens in a single store operation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no elf has this id.
    /// Returns `StoreError::Fetch` or `StoreError::Write` on store failures.
    #[instrument(skip(self), fields(elf_id = %id))]
    pub async fn boost_energy(&self, id: &ElfId, policy: ElfBoostPolicy) -> Result<Elf, StoreError> {
        match policy {
            ElfBoostPolicy::Preview => {
                let elf = self.get_by_id(id).await?;
                Ok(Elf {
                    energy: elf.energy.boosted(),
                    ..elf
                })
            }
            ElfBoostPolicy::Persist => {
                let op = FieldOp::AddClamped {
                    field: "energy",
                    delta: Energy::BOOST_STEP,
                    min: Energy::MIN,
                    max: Energy::MAX,
                    default: i64::from(Energy::DEFAULT),
                };
                let elf: Elf = self
                    .store
                    .apply(Self::COLLECTION, id.as_str(), op)
                    .await
                    .map_err(StoreError::write(Self::COLLECTION))?
                    .ok_or_else(|| StoreError::not_found(Self::COLLECTION, id.as_str()))?
                    .decode(Self::COLLECTION)?;
                tracing::info!(energy = %elf.energy, "Elf energy boosted");
                Ok(elf)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;

    fn buddy(energy: Option<i64>) -> NewElf {
        NewElf {
            name: "Buddy".to_string(),
            role: "Builder".to_string(),
            energy,
        }
    }

    #[tokio::test]
    async fn test_create_clamps_energy() {
        let store = MemoryDocumentStore::new();
        let repo = ElfRepository::new(&store);

        assert_eq!(repo.create(buddy(Some(150))).await.unwrap().energy.value(), 100);
        assert_eq!(repo.create(buddy(Some(-20))).await.unwrap().energy.value(), 0);
        assert_eq!(repo.create(buddy(None)).await.unwrap().energy.value(), 50);
    }

    #[tokio::test]
    async fn test_update_clamps_energy() {
        let store = MemoryDocumentStore::new();
        let repo = ElfRepository::new(&store);
        let elf = repo.create(buddy(Some(40))).await.unwrap();

        let updated = repo
            .update(
                &elf.id,
                ElfPatch {
                    energy: Some(500),
                    ..ElfPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.energy.value(), 100);
        assert_eq!(updated.name, "Buddy");
    }

    #[tokio::test]
    async fn test_boost_preview_does_not_write() {
        let store = MemoryDocumentStore::new();
        let repo = ElfRepository::new(&store);
        let elf = repo.create(buddy(Some(95))).await.unwrap();

        let boosted = repo
            .boost_energy(&elf.id, ElfBoostPolicy::Preview)
            .await
            .unwrap();
        assert_eq!(boosted.energy.value(), 100);
        assert_eq!(repo.get_by_id(&elf.id).await.unwrap().energy.value(), 95);
    }

    #[tokio::test]
    async fn test_boost_persist_writes() {
        let store = MemoryDocumentStore::new();
        let repo = ElfRepository::new(&store);
        let elf = repo.create(buddy(Some(50))).await.unwrap();

        repo.boost_energy(&elf.id, ElfBoostPolicy::Persist)
            .await
            .unwrap();
        let stored = repo.get_by_id(&elf.id).await.unwrap();
        assert_eq!(stored.energy.value(), 60);
    }

    #[tokio::test]
    async fn test_boost_missing_elf() {
        let store = MemoryDocumentStore::new();
        let repo = ElfRepository::new(&store);
        let missing = ElfId::new("nobody");
        for policy in [ElfBoostPolicy::Preview, ElfBoostPolicy::Persist] {
            assert!(
                repo.boost_energy(&missing, policy)
                    .await
                    .unwrap_err()
                    .is_not_found()
            );
        }
    }
}
