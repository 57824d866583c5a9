//! PostgreSQL document store: one JSONB row per document in the `documents` table.
//!
//! Rows are partitioned by `collection` and unique on `(collection, key)`,
//! where `key` is the document's business `id`. The storage key is the
//! `storage_id` UUID column and is injected as `_id` on read.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use coverdesk_core::{business_key, Record, STORAGE_KEY};

use crate::error::StorageError;
use crate::traits::DocumentStore;

pub struct PgDocumentStore {
    pool: PgPool,
    collection: String,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
        }
    }
}

/// Escape `%`, `_` and `\` so user text matches literally inside `LIKE`.
pub(crate) fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Stored body without any `_id`.
fn body_of(record: &Record) -> Record {
    record
        .iter()
        .filter(|(field, _)| field.as_str() != STORAGE_KEY)
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

fn document_from_row((storage_id, Json(body)): (Uuid, Json<Record>)) -> Record {
    let mut doc = Record::new();
    doc.insert(STORAGE_KEY.to_string(), Value::String(storage_id.to_string()));
    for (field, value) in body {
        if field != STORAGE_KEY {
            doc.insert(field, value);
        }
    }
    doc
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<Record>, StorageError> {
        let row = sqlx::query_as::<_, (Uuid, Json<Record>)>(
            "SELECT storage_id, body FROM documents WHERE collection = $1 AND key = $2",
        )
        .bind(&self.collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(document_from_row))
    }

    async fn insert_many(&self, records: &[Record]) -> Result<usize, StorageError> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            let key = business_key(record).ok_or(StorageError::MissingKey)?;
            sqlx::query(
                "INSERT INTO documents (storage_id, collection, key, body) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(&self.collection)
            .bind(key)
            .bind(Json(body_of(record)))
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::from_sqlx(e, key))?;
        }

        tx.commit().await?;
        debug!(collection = %self.collection, count = records.len(), "Inserted documents");
        Ok(records.len())
    }

    async fn update_by_key(&self, key: &str, fields: &Record) -> Result<(), StorageError> {
        let result = sqlx::query(
            "UPDATE documents SET body = body || $3, updated_at = now()
             WHERE collection = $1 AND key = $2",
        )
        .bind(&self.collection)
        .bind(key)
        .bind(Json(body_of(fields)))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Record>, StorageError> {
        let rows = sqlx::query_as::<_, (Uuid, Json<Record>)>(
            "SELECT storage_id, body FROM documents WHERE collection = $1 ORDER BY seq",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(document_from_row).collect())
    }

    async fn search_by_name(&self, needle: &str) -> Result<Vec<Record>, StorageError> {
        let pattern = format!("%{}%", escape_like(needle));
        let rows = sqlx::query_as::<_, (Uuid, Json<Record>)>(
            "SELECT storage_id, body FROM documents
             WHERE collection = $1 AND body->>'name' ILIKE $2
             ORDER BY seq",
        )
        .bind(&self.collection)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(document_from_row).collect())
    }

    async fn delete_by_key(&self, key: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND key = $2")
            .bind(&self.collection)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn like_metacharacters_escaped() {
        assert_eq!(escape_like("kid"), "kid");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn body_never_carries_storage_key() {
        let record = json!({"_id": "client", "id": "pkg1", "name": "Basic"})
            .as_object()
            .cloned()
            .unwrap();
        let body = body_of(&record);
        assert!(!body.contains_key(STORAGE_KEY));
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn row_gets_storage_key_first() {
        let id = Uuid::new_v4();
        let body = json!({"id": "pkg1", "_id": "stale"}).as_object().cloned().unwrap();
        let doc = document_from_row((id, Json(body)));
        let keys: Vec<&str> = doc.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["_id", "id"]);
        assert_eq!(doc[STORAGE_KEY], json!(id.to_string()));
    }
}
