// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod invoke;
pub mod list;
pub mod up;
pub mod validate;

use std::sync::Arc;

use servmon_core::{ensure_schema, Config, KeyValueStore, SchemaOutcome, ServerInventory};

/// Open the configured store and run the one-time schema bootstrap.
///
/// The bootstrap polls with blocking sleeps, so it runs on the blocking pool.
pub(crate) async fn bootstrap(
    config: &Config,
) -> Result<(ServerInventory, SchemaOutcome), Box<dyn std::error::Error>> {
    let store: Arc<dyn KeyValueStore> = config.store.open()?;
    let schema = config.schema.clone();

    let handle = Arc::clone(&store);
    let outcome =
        tokio::task::spawn_blocking(move || ensure_schema(handle.as_ref(), &schema)).await??;

    tracing::info!(
        backend = store.backend_name(),
        table = %config.schema.table,
        outcome = ?outcome,
        "Schema ready"
    );

    Ok((
        ServerInventory::new(store, config.schema.table.clone()),
        outcome,
    ))
}
