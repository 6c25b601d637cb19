//! In-process document store.
//!
//! Used when no database URL is configured and by the test suites. Documents
//! keep insertion order, matching the `created_at` ordering of the
//! `PostgreSQL` backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::BackendError;
use super::document::{Document, DocumentStore, FieldOp, Fields};

/// Document store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    simulate_read_error: AtomicBool,
    simulate_write_error: AtomicBool,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail, for exercising error paths.
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.store(simulate, Ordering::SeqCst);
    }

    /// Make every write fail, for exercising error paths.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), BackendError> {
        if self.simulate_read_error.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("simulated read error".to_owned()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), BackendError> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(
                "simulated write error".to_owned(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, BackendError> {
        self.check_read()?;
        let collections = self.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, BackendError> {
        self.check_read()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.fields.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        self.check_read()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn add(
        &self,
        collection: &str,
        mut fields: Fields,
        timestamp_field: Option<&str>,
    ) -> Result<Document, BackendError> {
        self.check_write()?;
        if let Some(field) = timestamp_field {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
            fields.insert(field.to_owned(), Value::String(now));
        }
        let doc = Document {
            id: Uuid::new_v4().simple().to_string(),
            fields,
        };
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_owned())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, BackendError> {
        self.check_write()?;
        let doc = Document {
            id: id.to_owned(),
            fields,
        };
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_owned()).or_default();
        match docs.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => existing.fields = doc.fields.clone(),
            None => docs.push(doc.clone()),
        }
        Ok(doc)
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> Result<Option<Document>, BackendError> {
        self.check_write()?;
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
        else {
            return Ok(None);
        };
        doc.fields.extend(patch);
        Ok(Some(doc.clone()))
    }

    async fn apply(
        &self,
        collection: &str,
        id: &str,
        op: FieldOp,
    ) -> Result<Option<Document>, BackendError> {
        self.check_write()?;
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
        else {
            return Ok(None);
        };
        op.apply_to(&mut doc.fields);
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, BackendError> {
        self.check_write()?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        Ok(docs.len() != before)
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.check_read()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_add_assigns_id_and_timestamp() {
        let store = MemoryDocumentStore::new();
        let doc = store
            .add("orders", fields(json!({ "childName": "Mia" })), Some("createdAt"))
            .await
            .unwrap();
        assert!(!doc.id.is_empty());
        assert!(doc.fields["createdAt"].is_string());

        let fetched = store.get("orders", &doc.id).await.unwrap().unwrap();
        assert_eq!(fetched, doc);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryDocumentStore::new();
        for name in ["a", "b", "c"] {
            store
                .add("toys", fields(json!({ "name": name })), None)
                .await
                .unwrap();
        }
        let names: Vec<_> = store
            .list("toys")
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.fields["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[tokio::test]
    async fn test_find_by_matches_exact_value() {
        let store = MemoryDocumentStore::new();
        store
            .add("orders", fields(json!({ "userId": "u1" })), None)
            .await
            .unwrap();
        store
            .add("orders", fields(json!({ "userId": null, "sessionId": "anon_1" })), None)
            .await
            .unwrap();

        let hits = store.find_by("orders", "userId", &json!("u1")).await.unwrap();
        assert_eq!(hits.len(), 1);
        let none = store.find_by("orders", "userId", &json!("u2")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_merge_missing_returns_none() {
        let store = MemoryDocumentStore::new();
        let merged = store
            .merge("toys", "nope", fields(json!({ "name": "x" })))
            .await
            .unwrap();
        assert!(merged.is_none());
    }

    #[tokio::test]
    async fn test_merge_is_shallow() {
        let store = MemoryDocumentStore::new();
        let doc = store
            .add("toys", fields(json!({ "name": "Robot", "category": "Tech" })), None)
            .await
            .unwrap();
        let merged = store
            .merge("toys", &doc.id, fields(json!({ "name": "Robo" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(merged.fields["name"], json!("Robo"));
        assert_eq!(merged.fields["category"], json!("Tech"));
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = MemoryDocumentStore::new();
        let doc = store.add("elves", Fields::new(), None).await.unwrap();
        assert!(store.delete("elves", &doc.id).await.unwrap());
        assert!(!store.delete("elves", &doc.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_upserts() {
        let store = MemoryDocumentStore::new();
        store
            .set("users", "u1", fields(json!({ "role": "user" })))
            .await
            .unwrap();
        store
            .set("users", "u1", fields(json!({ "role": "admin" })))
            .await
            .unwrap();
        let docs = store.list("users").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields["role"], json!("admin"));
    }

    #[tokio::test]
    async fn test_simulated_errors() {
        let store = MemoryDocumentStore::new();
        store.set_simulate_write_error(true);
        assert!(store.add("toys", Fields::new(), None).await.is_err());
        store.set_simulate_write_error(false);
        store.set_simulate_read_error(true);
        assert!(store.list("toys").await.is_err());
        assert!(store.ping().await.is_err());
    }
}
