//! Upload reconciliation: match incoming records against a document store by
//! business key and classify each one as inserted, updated, unchanged,
//! conflicting or skipped.

pub mod diff;
pub mod error;
pub mod reconciler;
pub mod types;

pub use diff::compare_documents;
pub use error::ReconcileError;
pub use reconciler::{reconcile, Reconciler, DEFAULT_INSERT_TIMEOUT};
pub use types::{Conflict, FieldDiff, SkipReason, SkippedRecord, UploadResult};
