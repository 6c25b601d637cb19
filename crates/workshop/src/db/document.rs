//! Document store abstraction.
//!
//! A document is a flat JSON object stored under `(collection, id)`. The id is
//! not part of the payload; repositories splice it back in when decoding.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{BackendError, StoreError};

/// Field map of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// A stored document with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// Decode into a record type, exposing the document id as the `id` field.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(self, collection: &'static str) -> Result<T, StoreError> {
        let Self { id, mut fields } = self;
        fields.insert("id".to_owned(), Value::String(id.clone()));
        serde_json::from_value(Value::Object(fields)).map_err(|e| StoreError::DataCorruption {
            collection,
            id,
            reason: e.to_string(),
        })
    }
}

/// Decode a batch of documents, failing on the first corrupt one.
///
/// # Errors
///
/// Returns `StoreError::DataCorruption` for the first document that does not
/// match `T`.
pub fn decode_all<T: DeserializeOwned>(
    docs: Vec<Document>,
    collection: &'static str,
) -> Result<Vec<T>, StoreError> {
    docs.into_iter().map(|doc| doc.decode(collection)).collect()
}

/// Encode a payload struct as a field map.
///
/// `None` fields marked `skip_serializing_if` are left out, which is what
/// makes a partial update a merge.
///
/// # Errors
///
/// Returns `BackendError` if the value does not serialize to a JSON object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, BackendError> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(BackendError::Unavailable(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// A store-side, single-document atomic field mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Negate a boolean field, treating a missing value as `default`.
    Negate { field: &'static str, default: bool },
    /// Add `delta` to an integer field and clamp the result into `min..=max`,
    /// treating a missing value as `default`.
    AddClamped {
        field: &'static str,
        delta: i64,
        min: i64,
        max: i64,
        default: i64,
    },
}

impl FieldOp {
    /// Apply the operation to an in-memory field map.
    pub fn apply_to(self, fields: &mut Fields) {
        match self {
            Self::Negate { field, default } => {
                let current = fields.get(field).and_then(Value::as_bool).unwrap_or(default);
                fields.insert(field.to_owned(), Value::Bool(!current));
            }
            Self::AddClamped {
                field,
                delta,
                min,
                max,
                default,
            } => {
                let current = fields.get(field).and_then(Value::as_i64).unwrap_or(default);
                let next = current.saturating_add(delta).clamp(min, max);
                fields.insert(field.to_owned(), Value::from(next));
            }
        }
    }
}

/// Backend for the record repositories.
///
/// Implementations provide last-writer-wins semantics; the only atomic
/// read-modify-write is [`DocumentStore::apply`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection, oldest first.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, BackendError>;

    /// Documents whose top-level `field` equals `value`, oldest first.
    async fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, BackendError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError>;

    /// Insert a document under a fresh id.
    ///
    /// When `timestamp_field` is given, the store writes its own current time
    /// into that field.
    async fn add(
        &self,
        collection: &str,
        fields: Fields,
        timestamp_field: Option<&str>,
    ) -> Result<Document, BackendError>;

    /// Create or replace the document at `id`.
    async fn set(&self, collection: &str, id: &str, fields: Fields)
    -> Result<Document, BackendError>;

    /// Shallow-merge `patch` into an existing document.
    ///
    /// Returns `None` if the document does not exist.
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> Result<Option<Document>, BackendError>;

    /// Apply an atomic field operation.
    ///
    /// Returns `None` if the document does not exist.
    async fn apply(
        &self,
        collection: &str,
        id: &str,
        op: FieldOp,
    ) -> Result<Option<Document>, BackendError>;

    /// Remove a document. Returns whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, BackendError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), BackendError>;
}
