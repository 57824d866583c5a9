use coverdesk_core::Record;

use super::{strip_bom, RecordParser};
use crate::error::ParseError;

/// A top-level JSON array of objects; each object is one record.
pub struct JsonParser;

impl RecordParser for JsonParser {
    fn format(&self) -> &'static str {
        "json"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Record>, ParseError> {
        let records: Vec<Record> = serde_json::from_slice(strip_bom(bytes))?;
        Ok(records)
    }
}
