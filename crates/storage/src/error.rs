use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no document with key '{0}'")]
    NotFound(String),

    #[error("record has no non-empty string 'id' field")]
    MissingKey,

    #[error("a document with key '{0}' already exists")]
    DuplicateKey(String),

    #[error("store operation timed out after {0}ms")]
    Timeout(u64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

impl StorageError {
    /// Map a sqlx error, recognising unique violations on the document key.
    pub(crate) fn from_sqlx(err: sqlx::Error, key: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StorageError::DuplicateKey(key.to_string());
            }
        }
        StorageError::Database(err)
    }
}
