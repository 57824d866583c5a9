pub mod error;
pub mod memory;
pub mod postgres;
pub mod traits;

use std::sync::Arc;

use sqlx::PgPool;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use traits::DocumentStore;

/// Collection holding insurance packages.
pub const PACKAGES: &str = "packages";
/// Collection holding package categories.
pub const CATEGORIES: &str = "categories";

/// The store handles the service works with, one per collection.
#[derive(Clone)]
pub struct Collections {
    pub packages: Arc<dyn DocumentStore>,
    pub categories: Arc<dyn DocumentStore>,
}

impl Collections {
    pub fn in_memory() -> Self {
        Self {
            packages: Arc::new(MemoryStore::new(PACKAGES)),
            categories: Arc::new(MemoryStore::new(CATEGORIES)),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            packages: Arc::new(PgDocumentStore::new(pool.clone(), PACKAGES)),
            categories: Arc::new(PgDocumentStore::new(pool, CATEGORIES)),
        }
    }

    /// Backend name shared by all collections.
    pub fn backend(&self) -> &'static str {
        self.packages.backend()
    }
}
