use thiserror::Error;

use coverdesk_storage::StorageError;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("batch insert of {attempted} new records failed: {source}")]
    InsertBatch {
        attempted: usize,
        #[source]
        source: StorageError,
    },
}
