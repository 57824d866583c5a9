//! Parse error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported file type '{extension}': supported types are {supported}")]
    UnsupportedFormat { extension: String, supported: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unreadable spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("{format} file needs a header row and at least one data row")]
    TooFewRows { format: &'static str },
}

impl ParseError {
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, ParseError::UnsupportedFormat { .. })
    }
}
