//! Document store trait.

use async_trait::async_trait;

use coverdesk_core::Record;

use crate::error::StorageError;

/// A keyed collection of mutable JSON documents.
///
/// Documents are addressed by their business key (the `id` field). Stores
/// assign their own storage key and expose it as `_id` on every document
/// they return; an `_id` on incoming records is always ignored.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logs and health output ("memory", "postgres").
    fn backend(&self) -> &'static str;

    /// Collection this handle reads and writes.
    fn collection(&self) -> &str;

    /// Fetch the document stored under `key`, or `None` when absent.
    async fn find_by_key(&self, key: &str) -> Result<Option<Record>, StorageError>;

    /// Insert all records or none of them. Returns the number inserted.
    ///
    /// Fails with [`StorageError::MissingKey`] if a record has no usable `id`
    /// and [`StorageError::DuplicateKey`] if a key already exists (in the
    /// store or earlier in the same batch).
    async fn insert_many(&self, records: &[Record]) -> Result<usize, StorageError>;

    /// Overwrite the given fields on the document stored under `key`,
    /// leaving its other fields untouched.
    async fn update_by_key(&self, key: &str, fields: &Record) -> Result<(), StorageError>;

    /// All documents in insertion order.
    async fn list(&self) -> Result<Vec<Record>, StorageError>;

    /// Documents whose `name` contains `needle`, case-insensitively.
    async fn search_by_name(&self, needle: &str) -> Result<Vec<Record>, StorageError>;

    /// Remove the document stored under `key`. Returns false if none existed.
    async fn delete_by_key(&self, key: &str) -> Result<bool, StorageError>;
}
