//! Server startup: store selection and shared state.

use std::sync::Arc;

use tracing::info;

use coverdesk_ingest::ParserRegistry;
use coverdesk_storage::Collections;

use crate::db;
use crate::state::AppState;

/// Pick the PostgreSQL stores when reachable, in-memory ones otherwise.
pub async fn init_collections(config: &coverdesk_core::Config) -> Collections {
    match db::init_pg_pool(&config.postgres).await {
        Some(pool) => Collections::postgres(pool),
        None => Collections::in_memory(),
    }
}

pub async fn build_app_state(config: &coverdesk_core::Config) -> Arc<AppState> {
    let stores = init_collections(config).await;
    let parsers = ParserRegistry::default();
    info!(
        store = stores.backend(),
        formats = %parsers.supported(),
        "Application state ready"
    );

    Arc::new(AppState {
        stores,
        parsers,
        upload: config.upload.clone(),
    })
}
