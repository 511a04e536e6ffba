// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! One-time table bootstrap.
//!
//! `ensure_schema` is called once at process start, never per request. It
//! provisions the inventory table when the store does not have it, waits for
//! the table to report ACTIVE by polling with a fixed delay, and writes the
//! configured seed records into a freshly created table.
//!
//! Seeding happens only on the run that created the table. If a seed write
//! fails the table stays partly seeded and the run fails with
//! `SeedIncomplete`; later runs find the table present and do not retry.

use std::time::{Duration, Instant};

use crate::codec;
use crate::error::{InventoryError, InventoryResult, StoreError};
use crate::record::Record;
use crate::store::{KeyValueStore, TableStatus};
use crate::types::{TableName, KEY_FIELD};

/// Default delay between two `describe_table` calls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Default upper bound on waiting for a table to become active.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(30);

/// What `ensure_schema` needs to know about the table.
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    pub table: TableName,
    pub poll_interval: Duration,
    pub ready_timeout: Duration,
    /// Records written right after the table is created.
    pub seed: Vec<Record>,
}

impl SchemaConfig {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            seed: Vec::new(),
        }
    }
}

/// Result of a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// The table existed already; nothing was written.
    AlreadyPresent,
    /// The table was created and `seeded` records were inserted.
    Created { seeded: usize },
}

/// Make sure the inventory table exists and is active.
///
/// Only "table not found" from the initial describe triggers provisioning; any
/// other error propagates without retry.
pub fn ensure_schema(
    store: &dyn KeyValueStore,
    config: &SchemaConfig,
) -> InventoryResult<SchemaOutcome> {
    let table = config.table.as_str();

    match store.describe_table(table) {
        Ok(TableStatus::Active) => {
            tracing::debug!(table, "Table already active");
            return Ok(SchemaOutcome::AlreadyPresent);
        }
        Ok(status) => {
            tracing::info!(table, status = %status, "Table exists but is not active yet");
            wait_until_active(store, config)?;
            return Ok(SchemaOutcome::AlreadyPresent);
        }
        Err(StoreError::TableNotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    tracing::info!(table, backend = store.backend_name(), "Table not initialized, creating");

    match store.create_table(table, KEY_FIELD) {
        Ok(()) => {}
        Err(StoreError::TableAlreadyExists { .. }) => {
            // Lost a creation race with another process.
            wait_until_active(store, config)?;
            return Ok(SchemaOutcome::AlreadyPresent);
        }
        Err(e) => return Err(e.into()),
    }

    wait_until_active(store, config)?;

    let total = config.seed.len();
    for (written, record) in config.seed.iter().enumerate() {
        store
            .put_item(table, codec::encode(record))
            .map_err(|source| InventoryError::SeedIncomplete {
                table: table.to_string(),
                written,
                total,
                source,
            })?;
    }

    tracing::info!(table, seeded = config.seed.len(), "Table initialized");
    Ok(SchemaOutcome::Created {
        seeded: config.seed.len(),
    })
}

fn wait_until_active(store: &dyn KeyValueStore, config: &SchemaConfig) -> InventoryResult<()> {
    let table = config.table.as_str();
    let start = Instant::now();

    loop {
        std::thread::sleep(config.poll_interval);

        let status = store.describe_table(table)?;
        if status == TableStatus::Active {
            tracing::debug!(
                table,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Table is active"
            );
            return Ok(());
        }

        if start.elapsed() >= config.ready_timeout {
            return Err(InventoryError::SchemaNotReady {
                table: table.to_string(),
                waited_ms: start.elapsed().as_millis() as u64,
            });
        }

        tracing::debug!(table, status = %status, "Waiting for table");
    }
}
