//! Extension-keyed parser lookup.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use coverdesk_core::Record;

use crate::error::ParseError;
use crate::format::{CsvParser, JsonParser, RecordParser, XlsxParser};

/// Lower-cased extension of `filename` without the dot, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Maps file extensions ("json", "csv", "xlsx") to parsers.
#[derive(Clone)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, Arc<dyn RecordParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::empty()
            .with("json", JsonParser)
            .with("csv", CsvParser)
            .with("xlsx", XlsxParser)
    }
}

impl ParserRegistry {
    pub fn empty() -> Self {
        Self { parsers: BTreeMap::new() }
    }

    /// Register a parser for an extension (replacing any previous one).
    pub fn with(mut self, extension: &str, parser: impl RecordParser + 'static) -> Self {
        self.parsers
            .insert(extension.trim_start_matches('.').to_ascii_lowercase(), Arc::new(parser));
        self
    }

    pub fn get(&self, extension: &str) -> Option<&Arc<dyn RecordParser>> {
        self.parsers.get(&extension.trim_start_matches('.').to_ascii_lowercase())
    }

    /// Supported extensions as ".json, .csv" for error messages.
    pub fn supported(&self) -> String {
        self.parsers
            .keys()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolve the parser from the file name, then decode.
    ///
    /// An unknown extension fails before any bytes are inspected.
    pub fn parse_upload(&self, filename: &str, bytes: &[u8]) -> Result<Vec<Record>, ParseError> {
        let extension = extension_of(filename).unwrap_or_default();
        let parser = self.get(&extension).ok_or_else(|| ParseError::UnsupportedFormat {
            extension: extension.clone(),
            supported: self.supported(),
        })?;

        let records = parser.parse(bytes)?;
        debug!(
            filename,
            format = parser.format(),
            bytes = bytes.len(),
            records = records.len(),
            "Parsed upload"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(extension_of("Packages.JSON").as_deref(), Some("json"));
        assert_eq!(extension_of("dir/file.tar.csv").as_deref(), Some("csv"));
        assert_eq!(extension_of("noext"), None);
    }

    #[test]
    fn default_registry_knows_three_formats() {
        let registry = ParserRegistry::default();
        assert!(registry.get("json").is_some());
        assert!(registry.get(".CSV").is_some());
        assert!(registry.get("xlsx").is_some());
        assert!(registry.get("xls").is_none());
        assert_eq!(registry.supported(), ".csv, .json, .xlsx");
    }

    #[test]
    fn dispatches_by_extension() {
        let registry = ParserRegistry::default();
        let records = registry
            .parse_upload("packages.csv", b"id,name\npkg2,Gold\n")
            .unwrap();
        assert_eq!(records.len(), 1);

        let records = registry
            .parse_upload("packages.json", br#"[{"id":"pkg1"}]"#)
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn unsupported_extension_rejected_before_parsing() {
        let registry = ParserRegistry::default();
        let err = registry.parse_upload("packages.txt", b"not inspected").unwrap_err();
        assert!(err.is_unsupported_format());
        assert!(err.to_string().contains(".json"));

        let err = registry.parse_upload("packages", b"[]").unwrap_err();
        assert!(err.is_unsupported_format());
    }

    #[test]
    fn custom_parsers_can_be_registered() {
        let registry = ParserRegistry::empty().with(".TSVJSON", JsonParser);
        assert!(registry.get("tsvjson").is_some());
        assert!(registry.parse_upload("a.csv", b"id\nx\n").is_err());
    }
}
