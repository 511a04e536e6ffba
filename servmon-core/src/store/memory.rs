// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Thread-safe in-memory store using DashMap.
//!
//! Conditional writes go through the DashMap entry API, so the existence check
//! and the write happen under the same shard lock.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::Ref;
use dashmap::DashMap;

use super::{item_key, Item, KeyValueStore, TableStatus};
use crate::error::{StoreError, StoreResult};

#[derive(Debug)]
struct MemoryTable {
    key_attribute: String,
    /// `describe_table` calls left before the table reports ACTIVE.
    pending_describes: u32,
    items: DashMap<String, Item>,
}

impl MemoryTable {
    fn status(&self) -> TableStatus {
        if self.pending_describes == 0 {
            TableStatus::Active
        } else {
            TableStatus::Creating
        }
    }
}

/// Process-local table store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<String, MemoryTable>,
    activation_lag: u32,
}

impl MemoryStore {
    /// Create an empty store whose new tables are active immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose new tables report CREATING for the first
    /// `describes` calls to `describe_table`.
    pub fn with_activation_lag(describes: u32) -> Self {
        Self {
            tables: DashMap::new(),
            activation_lag: describes,
        }
    }

    /// Create a store wrapped in an Arc for sharing across threads.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn active_table(&self, table: &str) -> StoreResult<Ref<'_, String, MemoryTable>> {
        let entry = self
            .tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })?;

        match entry.status() {
            TableStatus::Active => Ok(entry),
            status => Err(StoreError::TableNotActive {
                table: table.to_string(),
                status: status.name(),
            }),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn describe_table(&self, table: &str) -> StoreResult<TableStatus> {
        let mut entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })?;

        let status = entry.status();
        entry.pending_describes = entry.pending_describes.saturating_sub(1);
        Ok(status)
    }

    fn create_table(&self, table: &str, key_attribute: &str) -> StoreResult<()> {
        match self.tables.entry(table.to_string()) {
            Entry::Occupied(_) => Err(StoreError::TableAlreadyExists {
                table: table.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(MemoryTable {
                    key_attribute: key_attribute.to_string(),
                    pending_describes: self.activation_lag,
                    items: DashMap::new(),
                });
                tracing::debug!(table, key_attribute, "Created in-memory table");
                Ok(())
            }
        }
    }

    fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<Item>> {
        let table = self.active_table(table)?;
        Ok(table.items.get(key).map(|item| item.clone()))
    }

    fn scan(&self, table: &str) -> StoreResult<Vec<Item>> {
        let table = self.active_table(table)?;
        Ok(table.items.iter().map(|r| r.value().clone()).collect())
    }

    fn put_item(&self, table: &str, item: Item) -> StoreResult<()> {
        let table = self.active_table(table)?;
        let key = item_key(&item, &table.key_attribute)?;
        table.items.insert(key, item);
        Ok(())
    }

    fn put_if_absent(&self, table_name: &str, item: Item) -> StoreResult<()> {
        let table = self.active_table(table_name)?;
        let key = item_key(&item, &table.key_attribute)?;

        let result = match table.items.entry(key) {
            Entry::Occupied(slot) => Err(StoreError::ConditionalCheckFailed {
                table: table_name.to_string(),
                key: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(item);
                Ok(())
            }
        };
        result
    }

    fn put_if_present(&self, table_name: &str, item: Item) -> StoreResult<()> {
        let table = self.active_table(table_name)?;
        let key = item_key(&item, &table.key_attribute)?;

        let result = match table.items.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(item);
                Ok(())
            }
            Entry::Vacant(slot) => Err(StoreError::ConditionalCheckFailed {
                table: table_name.to_string(),
                key: slot.into_key(),
            }),
        };
        result
    }

    fn delete_returning(&self, table: &str, key: &str) -> StoreResult<Option<Item>> {
        let table = self.active_table(table)?;
        Ok(table.items.remove(key).map(|(_, item)| item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AttributeValue;

    fn item(id: &str, memory: &str) -> Item {
        let mut item = Item::new();
        item.insert("server_id".to_string(), AttributeValue::S(id.to_string()));
        item.insert("memory".to_string(), AttributeValue::N(memory.to_string()));
        item
    }

    fn store_with_table() -> MemoryStore {
        let store = MemoryStore::new();
        store.create_table("servers", "server_id").unwrap();
        store
    }

    #[test]
    fn test_unknown_table() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.describe_table("servers"),
            Err(StoreError::TableNotFound { .. })
        ));
        assert!(matches!(
            store.get_item("servers", "A"),
            Err(StoreError::TableNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_table() {
        let store = store_with_table();
        assert!(matches!(
            store.create_table("servers", "server_id"),
            Err(StoreError::TableAlreadyExists { .. })
        ));
    }

    #[test]
    fn test_activation_lag() {
        let store = MemoryStore::with_activation_lag(2);
        store.create_table("servers", "server_id").unwrap();

        assert!(matches!(
            store.put_item("servers", item("A", "1")),
            Err(StoreError::TableNotActive { .. })
        ));
        assert_eq!(store.describe_table("servers").unwrap(), TableStatus::Creating);
        assert_eq!(store.describe_table("servers").unwrap(), TableStatus::Creating);
        assert_eq!(store.describe_table("servers").unwrap(), TableStatus::Active);
        assert!(store.put_item("servers", item("A", "1")).is_ok());
    }

    #[test]
    fn test_conditional_writes() {
        let store = store_with_table();

        store.put_if_absent("servers", item("A", "1")).unwrap();
        let err = store.put_if_absent("servers", item("A", "2")).unwrap_err();
        assert!(err.is_conditional_check_failed());
        assert_eq!(
            store.get_item("servers", "A").unwrap(),
            Some(item("A", "1"))
        );

        store.put_if_present("servers", item("A", "3")).unwrap();
        assert_eq!(
            store.get_item("servers", "A").unwrap(),
            Some(item("A", "3"))
        );

        let err = store.put_if_present("servers", item("B", "1")).unwrap_err();
        assert!(err.is_conditional_check_failed());
        assert_eq!(store.get_item("servers", "B").unwrap(), None);
    }

    #[test]
    fn test_delete_returning() {
        let store = store_with_table();
        store.put_item("servers", item("A", "1")).unwrap();

        assert_eq!(
            store.delete_returning("servers", "A").unwrap(),
            Some(item("A", "1"))
        );
        assert_eq!(store.delete_returning("servers", "A").unwrap(), None);
    }

    #[test]
    fn test_rejects_item_without_string_key() {
        let store = store_with_table();
        let mut bad = Item::new();
        bad.insert("server_id".to_string(), AttributeValue::N("7".to_string()));

        assert!(matches!(
            store.put_if_absent("servers", bad),
            Err(StoreError::Validation { .. })
        ));
    }

    #[test]
    fn test_concurrent_put_if_absent_single_winner() {
        use std::thread;

        let store = Arc::new(store_with_table());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .put_if_absent("servers", item("contended", &i.to_string()))
                        .is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.scan("servers").unwrap().len(), 1);
    }
}
