use serde_json::Value;

use coverdesk_core::Record;

use super::{records_from_rows, strip_bom, RecordParser};
use crate::error::ParseError;

/// Comma-separated values with a mandatory header row. Every value is text.
pub struct CsvParser;

impl RecordParser for CsvParser {
    fn format(&self) -> &'static str {
        "csv"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Record>, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(strip_bom(bytes));

        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row?;
            rows.push(row.iter().map(|cell| Value::String(cell.to_string())).collect());
        }

        records_from_rows(self.format(), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_and_one_row() {
        let records = CsvParser.parse(b"id,name\npkg2,Gold\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], json!("pkg2"));
        assert_eq!(records[0]["name"], json!("Gold"));
    }

    #[test]
    fn numbers_stay_text() {
        let records = CsvParser.parse(b"id,minAge\npkg1,25\n").unwrap();
        assert_eq!(records[0]["minAge"], json!("25"));
    }

    #[test]
    fn ragged_rows_accepted() {
        let records = CsvParser.parse(b"id,name,tier\npkg1,Basic\npkg2,Gold,vip,extra\n").unwrap();
        assert_eq!(records.len(), 2);
        assert!(!records[0].contains_key("tier"));
        assert_eq!(records[1]["tier"], json!("vip"));
        assert_eq!(records[1].len(), 3);
    }

    #[test]
    fn quoted_fields_with_commas() {
        let records = CsvParser.parse(b"id,name\npkg1,\"Basic, Plus\"\n").unwrap();
        assert_eq!(records[0]["name"], json!("Basic, Plus"));
    }

    #[test]
    fn bom_does_not_leak_into_header() {
        let records = CsvParser.parse(b"\xEF\xBB\xBFid,name\npkg1,Basic\n").unwrap();
        assert!(records[0].contains_key("id"));
    }

    #[test]
    fn blank_lines_ignored() {
        let records = CsvParser.parse(b"id,name\n\npkg1,Basic\n\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], json!("pkg1"));
        assert_eq!(records[0]["name"], json!("Basic"));
    }

    #[test]
    fn header_only_rejected() {
        let err = CsvParser.parse(b"id,name\n").unwrap_err();
        assert!(matches!(err, ParseError::TooFewRows { format: "csv" }));
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(CsvParser.parse(b"").unwrap_err(), ParseError::TooFewRows { .. }));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let err = CsvParser.parse(b"id,name\npkg1,\xFF\xFE\n").unwrap_err();
        assert!(matches!(err, ParseError::Csv(_)));
    }
}
