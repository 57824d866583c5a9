//! Upload parsing: turn JSON / CSV / XLSX bytes into flat [`Record`]s.
//!
//! This crate provides:
//! - `RecordParser` trait for pluggable file formats
//! - JSON array, CSV and first-sheet XLSX parsers
//! - `ParserRegistry` that resolves a parser from the file extension
//!
//! [`Record`]: coverdesk_core::Record

pub mod error;
pub mod format;
pub mod registry;

pub use error::ParseError;
pub use format::{CsvParser, JsonParser, RecordParser, XlsxParser};
pub use registry::{extension_of, ParserRegistry};
