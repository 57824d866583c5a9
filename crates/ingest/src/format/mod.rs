mod delimited;
mod json;
mod spreadsheet;

pub use delimited::CsvParser;
pub use json::JsonParser;
pub use spreadsheet::XlsxParser;

use serde_json::Value;

use coverdesk_core::{value_text, Record};

use crate::error::ParseError;

/// A file format that decodes raw upload bytes into records.
pub trait RecordParser: Send + Sync {
    /// Short format name used in logs and errors ("json", "csv", "xlsx").
    fn format(&self) -> &'static str;

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Record>, ParseError>;
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(crate) fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Zip every data row positionally against the header row.
///
/// Cells past the header's width are dropped and short rows simply lack the
/// trailing fields. Columns with an empty header name are ignored.
pub(crate) fn records_from_rows(
    format: &'static str,
    rows: Vec<Vec<Value>>,
) -> Result<Vec<Record>, ParseError> {
    if rows.len() < 2 {
        return Err(ParseError::TooFewRows { format });
    }

    let mut rows = rows.into_iter();
    let header: Vec<String> = rows
        .next()
        .unwrap_or_default()
        .iter()
        .map(|cell| value_text(cell).trim().to_string())
        .collect();

    let records = rows
        .map(|row| {
            header
                .iter()
                .zip(row)
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, value)| (name.clone(), value))
                .collect::<Record>()
        })
        .collect();

    Ok(records)
}
