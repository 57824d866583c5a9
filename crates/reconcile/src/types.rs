use serde::Serialize;
use serde_json::Value;

use coverdesk_core::Record;

/// One field whose canonical text differs between the stored and incoming document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiff {
    pub field: String,
    /// Stored value, or null when the field is new.
    pub old: Value,
    pub new: Value,
}

/// A record whose stored counterpart differs and was not overwritten.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub id: String,
    pub diffs: Vec<FieldDiff>,
    pub old: Record,
    pub new: Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingId,
    DuplicateInUpload,
    LookupFailed,
    UpdateFailed,
}

/// A record that was neither inserted, updated, unchanged nor conflicting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    /// Position in the uploaded file, zero-based.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reason: SkipReason,
    /// Store error text for `lookup_failed` / `update_failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SkippedRecord {
    pub(crate) fn new(index: usize, id: Option<&str>, reason: SkipReason) -> Self {
        Self {
            index,
            id: id.map(str::to_string),
            reason,
            error: None,
        }
    }

    pub(crate) fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadResult {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub conflicts: Vec<Conflict>,
    pub skipped: Vec<SkippedRecord>,
}

impl UploadResult {
    /// One-line summary for logs and CLI output.
    pub fn summary(&self) -> String {
        format!(
            "inserted={} updated={} unchanged={} conflicts={} skipped={}",
            self.inserted,
            self.updated,
            self.unchanged,
            self.conflicts.len(),
            self.skipped.len()
        )
    }
}
