// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Key-value store capability.
//!
//! The inventory talks to its backend only through [`KeyValueStore`]. A
//! backend owns single-key atomicity: the existence checks of
//! `put_if_absent`/`put_if_present` and the removal of `delete_returning`
//! each happen in one step inside the store.
//!
//! ## Backends
//! - [`MemoryStore`]: DashMap-backed, process-local.
//! - [`FileStore`]: embedded, one JSON document per table on disk.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A typed attribute value as the store persists it.
///
/// Serialized DynamoDB-style: `{"S": "text"}`, `{"N": "42"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    S(String),
    #[serde(rename = "N")]
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
}

impl AttributeValue {
    /// Wire tag of the variant.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::Bool(_) => "BOOL",
            Self::Null(_) => "NULL",
        }
    }
}

/// A record in the store's typed encoding.
pub type Item = BTreeMap<String, AttributeValue>;

/// Provisioning state of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatus {
    Creating,
    Active,
}

impl TableStatus {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Creating => "CREATING",
            Self::Active => "ACTIVE",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Capability interface for a single-key-per-item table store.
///
/// Data-plane calls fail with [`StoreError::TableNotFound`] for an unknown
/// table and [`StoreError::TableNotActive`] while the table is still being
/// provisioned. Items must carry their table's key attribute as `S`,
/// otherwise the call fails with [`StoreError::Validation`].
pub trait KeyValueStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    fn describe_table(&self, table: &str) -> StoreResult<TableStatus>;

    fn create_table(&self, table: &str, key_attribute: &str) -> StoreResult<()>;

    fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<Item>>;

    /// Every item in the table, in backend enumeration order.
    fn scan(&self, table: &str) -> StoreResult<Vec<Item>>;

    /// Unconditional write.
    fn put_item(&self, table: &str, item: Item) -> StoreResult<()>;

    /// Write only if no item has the same key.
    /// Fails with [`StoreError::ConditionalCheckFailed`] otherwise.
    fn put_if_absent(&self, table: &str, item: Item) -> StoreResult<()>;

    /// Write only if an item with the same key exists.
    /// Fails with [`StoreError::ConditionalCheckFailed`] otherwise.
    fn put_if_present(&self, table: &str, item: Item) -> StoreResult<()>;

    /// Remove the item and return what was stored, if anything.
    fn delete_returning(&self, table: &str, key: &str) -> StoreResult<Option<Item>>;
}

/// Pull the string key out of an item.
pub(crate) fn item_key(item: &Item, key_attribute: &str) -> StoreResult<String> {
    match item.get(key_attribute) {
        Some(AttributeValue::S(key)) if !key.is_empty() => Ok(key.clone()),
        Some(AttributeValue::S(_)) => Err(StoreError::Validation {
            reason: format!("key attribute '{}' must not be empty", key_attribute),
        }),
        Some(other) => Err(StoreError::Validation {
            reason: format!(
                "key attribute '{}' must be of type S, got {}",
                key_attribute,
                other.tag()
            ),
        }),
        None => Err(StoreError::Validation {
            reason: format!("item is missing key attribute '{}'", key_attribute),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_wire_format() {
        let mut item = Item::new();
        item.insert("server_id".to_string(), AttributeValue::S("A".to_string()));
        item.insert("memory".to_string(), AttributeValue::N("8589934592".to_string()));

        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"memory":{"N":"8589934592"},"server_id":{"S":"A"}}"#);
    }

    #[test]
    fn test_item_key_validation() {
        let mut item = Item::new();
        assert!(matches!(
            item_key(&item, "server_id"),
            Err(StoreError::Validation { .. })
        ));

        item.insert("server_id".to_string(), AttributeValue::N("1".to_string()));
        assert!(matches!(
            item_key(&item, "server_id"),
            Err(StoreError::Validation { .. })
        ));

        item.insert("server_id".to_string(), AttributeValue::S("A".to_string()));
        assert_eq!(item_key(&item, "server_id").unwrap(), "A");
    }
}
