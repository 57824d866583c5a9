use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use coverdesk_core::{business_key, strip_storage_key, Record};
use coverdesk_storage::{DocumentStore, StorageError};

use crate::diff::compare_documents;
use crate::error::ReconcileError;
use crate::types::{Conflict, SkipReason, SkippedRecord, UploadResult};

/// Upper bound on the final batch insert unless configured otherwise.
pub const DEFAULT_INSERT_TIMEOUT: Duration = Duration::from_secs(30);

/// Terminal state of one record within a reconciliation run.
#[derive(Debug)]
enum Outcome {
    Skipped(SkippedRecord),
    PendingInsert(String, Record),
    Unchanged,
    Updated,
    Conflicted(Conflict),
}

/// Accumulates per-record outcomes; the pending batch is inserted at the end.
#[derive(Default)]
struct Tally {
    result: UploadResult,
    pending: Vec<Record>,
    pending_keys: HashSet<String>,
}

impl Tally {
    fn push(mut self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Skipped(skipped) => self.result.skipped.push(skipped),
            Outcome::PendingInsert(key, record) => {
                self.pending_keys.insert(key);
                self.pending.push(record);
            }
            Outcome::Unchanged => self.result.unchanged += 1,
            Outcome::Updated => self.result.updated += 1,
            Outcome::Conflicted(conflict) => self.result.conflicts.push(conflict),
        }
        self
    }
}

/// Reconciles parsed upload records against one document store.
///
/// Records are processed sequentially in input order. Lookup and update
/// failures are recorded per record and never abort the run; only the final
/// batch insert can fail the whole call.
pub struct Reconciler<'a> {
    store: &'a dyn DocumentStore,
    force: bool,
    insert_timeout: Duration,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            force: false,
            insert_timeout: DEFAULT_INSERT_TIMEOUT,
        }
    }

    /// Overwrite differing stored documents instead of reporting conflicts.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn insert_timeout(mut self, timeout: Duration) -> Self {
        self.insert_timeout = timeout;
        self
    }

    pub async fn run(self, records: Vec<Record>) -> Result<UploadResult, ReconcileError> {
        info!(
            collection = self.store.collection(),
            records = records.len(),
            force = self.force,
            "Reconciling upload"
        );

        let mut tally = Tally::default();
        for (index, record) in records.into_iter().enumerate() {
            let outcome = self.classify(index, record, &tally.pending_keys).await;
            tally = tally.push(outcome);
        }

        let Tally {
            mut result, pending, ..
        } = tally;

        if !pending.is_empty() {
            result.inserted = self.insert_batch(&pending).await?;
        }

        info!(collection = self.store.collection(), "Upload reconciled: {}", result.summary());
        Ok(result)
    }

    async fn classify(
        &self,
        index: usize,
        mut record: Record,
        pending_keys: &HashSet<String>,
    ) -> Outcome {
        strip_storage_key(&mut record);

        let Some(key) = business_key(&record).map(str::to_string) else {
            debug!(index, "Record has no usable id, skipping");
            return Outcome::Skipped(SkippedRecord::new(index, None, SkipReason::MissingId));
        };

        if pending_keys.contains(&key) {
            debug!(index, id = %key, "Duplicate id within upload, skipping");
            return Outcome::Skipped(SkippedRecord::new(
                index,
                Some(&key),
                SkipReason::DuplicateInUpload,
            ));
        }

        let existing = match self.store.find_by_key(&key).await {
            Ok(Some(existing)) => existing,
            Ok(None) => return Outcome::PendingInsert(key, record),
            Err(e) => {
                warn!(index, id = %key, error = %e, "Lookup failed, skipping record");
                return Outcome::Skipped(
                    SkippedRecord::new(index, Some(&key), SkipReason::LookupFailed).with_error(e),
                );
            }
        };

        let diffs = compare_documents(&existing, &record);
        if diffs.is_empty() {
            return Outcome::Unchanged;
        }

        if !self.force {
            debug!(id = %key, fields = diffs.len(), "Conflict");
            return Outcome::Conflicted(Conflict {
                id: key,
                diffs,
                old: existing,
                new: record,
            });
        }

        match self.store.update_by_key(&key, &record).await {
            Ok(()) => {
                debug!(id = %key, fields = diffs.len(), "Forced update applied");
                Outcome::Updated
            }
            Err(e) => {
                warn!(index, id = %key, error = %e, "Forced update failed, skipping record");
                Outcome::Skipped(
                    SkippedRecord::new(index, Some(&key), SkipReason::UpdateFailed).with_error(e),
                )
            }
        }
    }

    async fn insert_batch(&self, pending: &[Record]) -> Result<usize, ReconcileError> {
        let attempted = pending.len();
        let outcome = tokio::time::timeout(self.insert_timeout, self.store.insert_many(pending))
            .await
            .unwrap_or_else(|_| {
                Err(StorageError::Timeout(self.insert_timeout.as_millis() as u64))
            });

        outcome.map_err(|source| {
            warn!(attempted, error = %source, "Batch insert failed");
            ReconcileError::InsertBatch { attempted, source }
        })
    }
}

/// Reconcile `records` into `store` with the default insert timeout.
pub async fn reconcile(
    records: Vec<Record>,
    force: bool,
    store: &dyn DocumentStore,
) -> Result<UploadResult, ReconcileError> {
    Reconciler::new(store).force(force).run(records).await
}
