use std::io::Cursor;

use calamine::{Data, ExcelDateTime, Reader, Xlsx};
use chrono::NaiveTime;
use serde_json::{Number, Value};

use coverdesk_core::Record;

use super::{records_from_rows, RecordParser};
use crate::error::ParseError;

/// Excel workbook; only the first sheet is read, its first row is the header.
pub struct XlsxParser;

impl RecordParser for XlsxParser {
    fn format(&self) -> &'static str {
        "xlsx"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Record>, ParseError> {
        let mut workbook: Xlsx<Cursor<&[u8]>> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| ParseError::Spreadsheet(e.to_string()))?;

        let first_sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ParseError::Spreadsheet("workbook has no sheets".to_string()))?;

        let range = workbook
            .worksheet_range(&first_sheet)
            .map_err(|e| ParseError::Spreadsheet(format!("sheet '{}': {}", first_sheet, e)))?;

        let rows = range.rows().map(row_values).collect();
        records_from_rows(self.format(), rows)
    }
}

/// Convert one sheet row, dropping trailing empty cells.
fn row_values(row: &[Data]) -> Vec<Value> {
    let used = row
        .iter()
        .rposition(|cell| !matches!(cell, Data::Empty))
        .map_or(0, |last| last + 1);
    row[..used].iter().map(cell_value).collect()
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Value::from(*f as i64)
            } else {
                Number::from_f64(*f)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(f.to_string()))
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::Empty => Value::String(String::new()),
        Data::DateTime(dt) => Value::String(date_text(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

/// `2024-01-15` for whole days, `2024-01-15 09:30:00` otherwise.
/// Durations keep the raw serial.
fn date_text(dt: &ExcelDateTime) -> String {
    if !dt.is_datetime() {
        return dt.as_f64().to_string();
    }
    match dt.as_datetime() {
        Some(at) if at.time() == NaiveTime::MIN => at.format("%Y-%m-%d").to_string(),
        Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => dt.as_f64().to_string(),
    }
}
