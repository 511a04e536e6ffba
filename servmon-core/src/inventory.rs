// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Server inventory: CRUD over one key-value table.
//!
//! Create and update are existence-conditioned writes evaluated by the store.
//! The store's conditional-check failure is the only fault turned into a
//! `false` result; every other store error propagates unchanged.

use std::sync::Arc;

use crate::codec;
use crate::error::{InventoryResult, StoreResult};
use crate::record::Record;
use crate::store::KeyValueStore;
use crate::types::TableName;

/// Inventory adapter over a [`KeyValueStore`].
#[derive(Clone)]
pub struct ServerInventory {
    store: Arc<dyn KeyValueStore>,
    table: TableName,
}

impl ServerInventory {
    /// Create an adapter for `table`. Does not touch the store; provisioning
    /// is done once at startup by [`crate::schema::ensure_schema`].
    pub fn new(store: Arc<dyn KeyValueStore>, table: TableName) -> Self {
        Self { store, table }
    }

    /// Fetch one server. `None` when no item has that key.
    pub fn get(&self, server_id: &str) -> InventoryResult<Option<Record>> {
        let item = self.store.get_item(self.table.as_str(), server_id)?;
        Ok(item.map(codec::decode))
    }

    /// All servers, in store enumeration order.
    pub fn list(&self) -> InventoryResult<Vec<Record>> {
        let items = self.store.scan(self.table.as_str())?;
        Ok(items.into_iter().map(codec::decode).collect())
    }

    /// Delete one server. Returns whether something was actually removed.
    pub fn delete(&self, server_id: &str) -> InventoryResult<bool> {
        let previous = self
            .store
            .delete_returning(self.table.as_str(), server_id)?;
        Ok(previous.is_some())
    }

    /// Insert a new server. Returns `false` if the key is already taken.
    pub fn add(&self, record: &Record) -> InventoryResult<bool> {
        let server_id = record.server_id()?;
        let item = codec::encode(record);
        tracing::debug!(server_id = %server_id, item = ?item, "Boxed record for insert");

        conditional(self.store.put_if_absent(self.table.as_str(), item))
    }

    /// Replace an existing server. Returns `false` if the key does not exist.
    pub fn update(&self, record: &Record) -> InventoryResult<bool> {
        let server_id = record.server_id()?;
        let item = codec::encode(record);
        tracing::debug!(server_id = %server_id, item = ?item, "Boxed record for update");

        conditional(self.store.put_if_present(self.table.as_str(), item))
    }
}

impl std::fmt::Debug for ServerInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerInventory")
            .field("backend", &self.store.backend_name())
            .field("table", &self.table)
            .finish()
    }
}

fn conditional(result: StoreResult<()>) -> InventoryResult<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_conditional_check_failed() => Ok(false),
        Err(e) => Err(e.into()),
    }
}
