use coverdesk_core::config::UploadConfig;
use coverdesk_ingest::ParserRegistry;
use coverdesk_storage::Collections;

/// Shared application state passed to all handlers.
pub struct AppState {
    pub stores: Collections,
    pub parsers: ParserRegistry,
    pub upload: UploadConfig,
}
