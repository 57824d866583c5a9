//! Offline import: reconcile a local file into the packages collection.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use coverdesk_reconcile::Reconciler;

use crate::startup;

pub async fn import_file(
    config: &coverdesk_core::Config,
    path: &Path,
    force: bool,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let stores = startup::init_collections(config).await;
    if stores.backend() == "memory" {
        warn!("Importing into an in-memory store; results are discarded on exit");
    }

    let parsers = coverdesk_ingest::ParserRegistry::default();
    let records = parsers
        .parse_upload(&filename, &bytes)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    info!("Read {} records from {}", records.len(), path.display());

    let result = Reconciler::new(stores.packages.as_ref())
        .force(force)
        .insert_timeout(config.upload.insert_timeout())
        .run(records)
        .await?;

    info!("Import complete: {}", result.summary());
    for conflict in &result.conflicts {
        let fields: Vec<&str> = conflict.diffs.iter().map(|d| d.field.as_str()).collect();
        info!("  conflict {}: {}", conflict.id, fields.join(", "));
    }
    for skipped in &result.skipped {
        warn!(
            "  skipped record {} ({:?}): {}",
            skipped.index,
            skipped.reason,
            skipped.error.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
