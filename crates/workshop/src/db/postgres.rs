//! `PostgreSQL` document store over a single JSONB table.
//!
//! ```sql
//! workshop.document (collection TEXT, id TEXT, data JSONB, created_at, updated_at)
//! ```
//!
//! Queries are built at runtime (`sqlx::query_as`) so the crate builds without
//! a live database. Atomic field operations are single `UPDATE` statements
//! using `jsonb_set`, so concurrent toggles never lose an update.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::BackendError;
use super::document::{Document, DocumentStore, FieldOp, Fields};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Fields>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            fields: row.data.0,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Document store backed by the `workshop.document` table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, BackendError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, data
            FROM workshop.document
            WHERE collection = $1
            ORDER BY created_at, id
            ",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, BackendError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, data
            FROM workshop.document
            WHERE collection = $1 AND data -> $2 = $3
            ORDER BY created_at, id
            ",
        )
        .bind(collection)
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, data
            FROM workshop.document
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn add(
        &self,
        collection: &str,
        fields: Fields,
        timestamp_field: Option<&str>,
    ) -> Result<Document, BackendError> {
        let id = Uuid::new_v4().simple().to_string();
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            INSERT INTO workshop.document (collection, id, data)
            VALUES (
                $1,
                $2,
                CASE
                    WHEN $4::text IS NULL THEN $3::jsonb
                    ELSE jsonb_set($3::jsonb, ARRAY[$4::text], to_jsonb(now()))
                END
            )
            RETURNING id, data
            ",
        )
        .bind(collection)
        .bind(&id)
        .bind(Json(&fields))
        .bind(timestamp_field)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, BackendError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            INSERT INTO workshop.document (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            RETURNING id, data
            ",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&fields))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> Result<Option<Document>, BackendError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            UPDATE workshop.document
            SET data = data || $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            RETURNING id, data
            ",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&patch))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn apply(
        &self,
        collection: &str,
        id: &str,
        op: FieldOp,
    ) -> Result<Option<Document>, BackendError> {
        let query = match op {
            FieldOp::Negate { field, default } => sqlx::query_as::<_, DocumentRow>(
                r"
                UPDATE workshop.document
                SET data = jsonb_set(
                        data,
                        ARRAY[$3::text],
                        to_jsonb(NOT COALESCE((data ->> $3)::boolean, $4))
                    ),
                    updated_at = now()
                WHERE collection = $1 AND id = $2
                RETURNING id, data
                ",
            )
            .bind(collection)
            .bind(id)
            .bind(field)
            .bind(default),
            FieldOp::AddClamped {
                field,
                delta,
                min,
                max,
                default,
            } => sqlx::query_as::<_, DocumentRow>(
                r"
                UPDATE workshop.document
                SET data = jsonb_set(
                        data,
                        ARRAY[$3::text],
                        to_jsonb(LEAST(GREATEST(COALESCE((data ->> $3)::bigint, $7) + $4, $5), $6))
                    ),
                    updated_at = now()
                WHERE collection = $1 AND id = $2
                RETURNING id, data
                ",
            )
            .bind(collection)
            .bind(id)
            .bind(field)
            .bind(delta)
            .bind(min)
            .bind(max)
            .bind(default),
        };

        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, BackendError> {
        let result = sqlx::query(
            r"
            DELETE FROM workshop.document
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), BackendError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
