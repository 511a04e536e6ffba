// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Embedded file-backed store.
//!
//! Each table lives in `<data_dir>/<table>.table.json`; other files in the
//! directory are ignored. The whole table is kept in memory behind one RwLock
//! and rewritten on every mutation (synced temp file, then rename). A
//! mutation that cannot be persisted is rolled back in memory.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::{item_key, Item, KeyValueStore, TableStatus};
use crate::error::{StoreError, StoreResult};

const TABLE_FILE_SUFFIX: &str = ".table.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableFile {
    key_attribute: String,
    #[serde(default)]
    items: BTreeMap<String, Item>,
}

/// Table store persisted as JSON documents in a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    tables: RwLock<HashMap<String, TableFile>>,
}

impl FileStore {
    /// Open (or initialize) a store rooted at `dir`, loading every table file
    /// found there.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();

        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Persistence {
            context: "creating data directory",
            source: e,
        })?;

        let entries = std::fs::read_dir(&dir).map_err(|e| StoreError::Persistence {
            context: "reading data directory",
            source: e,
        })?;

        let mut tables = HashMap::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StoreError::Persistence {
                    context: "reading data directory entry",
                    source: e,
                })?
                .path();

            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(TABLE_FILE_SUFFIX))
                .filter(|n| !n.is_empty())
                .map(str::to_string)
            else {
                continue;
            };

            let content = std::fs::read(&path).map_err(|e| StoreError::Persistence {
                context: "reading table file",
                source: e,
            })?;
            let table: TableFile =
                serde_json::from_slice(&content).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    message: e.to_string(),
                })?;

            tracing::debug!(
                table = %name,
                items = table.items.len(),
                path = %path.display(),
                "Loaded table file"
            );
            tables.insert(name, table);
        }

        Ok(Self {
            dir,
            tables: RwLock::new(tables),
        })
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}{}", table, TABLE_FILE_SUFFIX))
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, TableFile>>> {
        self.tables.read().map_err(|_| StoreError::Unavailable {
            reason: "table lock poisoned".to_string(),
        })
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, TableFile>>> {
        self.tables.write().map_err(|_| StoreError::Unavailable {
            reason: "table lock poisoned".to_string(),
        })
    }

    fn persist(&self, name: &str, table: &TableFile) -> StoreResult<()> {
        let path = self.table_path(name);
        let tmp = path.with_extension("json.tmp");

        let content = serde_json::to_vec_pretty(table).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let write_synced = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&content)?;
            file.sync_all()
        };
        write_synced().map_err(|e| StoreError::Persistence {
            context: "writing table file",
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| StoreError::Persistence {
            context: "replacing table file",
            source: e,
        })
    }

    /// Apply `mutate` to a table's items and persist, undoing the change if
    /// the write to disk fails.
    fn mutate<T>(
        &self,
        name: &str,
        mutate: impl FnOnce(&str, &mut BTreeMap<String, Item>) -> StoreResult<(T, Undo)>,
    ) -> StoreResult<T> {
        let mut tables = self.write()?;
        let table = tables
            .get_mut(name)
            .ok_or_else(|| StoreError::TableNotFound {
                table: name.to_string(),
            })?;

        let (result, undo) = mutate(&table.key_attribute, &mut table.items)?;

        if let Err(e) = self.persist(name, table) {
            undo.apply(&mut table.items);
            return Err(e);
        }

        Ok(result)
    }
}

/// Inverse of one single-key mutation.
enum Undo {
    Nothing,
    Restore(String, Item),
    Remove(String),
}

impl Undo {
    fn apply(self, items: &mut BTreeMap<String, Item>) {
        match self {
            Self::Nothing => {}
            Self::Restore(key, item) => {
                items.insert(key, item);
            }
            Self::Remove(key) => {
                items.remove(&key);
            }
        }
    }

    fn replaced(key: String, previous: Option<Item>) -> Self {
        match previous {
            Some(item) => Self::Restore(key, item),
            None => Self::Remove(key),
        }
    }
}

impl KeyValueStore for FileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    fn describe_table(&self, table: &str) -> StoreResult<TableStatus> {
        if self.read()?.contains_key(table) {
            Ok(TableStatus::Active)
        } else {
            Err(StoreError::TableNotFound {
                table: table.to_string(),
            })
        }
    }

    fn create_table(&self, table: &str, key_attribute: &str) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.contains_key(table) {
            return Err(StoreError::TableAlreadyExists {
                table: table.to_string(),
            });
        }

        let file = TableFile {
            key_attribute: key_attribute.to_string(),
            items: BTreeMap::new(),
        };
        self.persist(table, &file)?;
        tables.insert(table.to_string(), file);

        tracing::debug!(table, key_attribute, dir = %self.dir.display(), "Created table file");
        Ok(())
    }

    fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<Item>> {
        let tables = self.read()?;
        let table = tables.get(table).ok_or_else(|| StoreError::TableNotFound {
            table: table.to_string(),
        })?;
        Ok(table.items.get(key).cloned())
    }

    fn scan(&self, table: &str) -> StoreResult<Vec<Item>> {
        let tables = self.read()?;
        let table = tables.get(table).ok_or_else(|| StoreError::TableNotFound {
            table: table.to_string(),
        })?;
        Ok(table.items.values().cloned().collect())
    }

    fn put_item(&self, table: &str, item: Item) -> StoreResult<()> {
        self.mutate(table, |key_attribute, items| {
            let key = item_key(&item, key_attribute)?;
            let previous = items.insert(key.clone(), item);
            Ok(((), Undo::replaced(key, previous)))
        })
    }

    fn put_if_absent(&self, table: &str, item: Item) -> StoreResult<()> {
        self.mutate(table, |key_attribute, items| {
            let key = item_key(&item, key_attribute)?;
            if items.contains_key(&key) {
                return Err(StoreError::ConditionalCheckFailed {
                    table: table.to_string(),
                    key,
                });
            }
            items.insert(key.clone(), item);
            Ok(((), Undo::Remove(key)))
        })
    }

    fn put_if_present(&self, table: &str, item: Item) -> StoreResult<()> {
        self.mutate(table, |key_attribute, items| {
            let key = item_key(&item, key_attribute)?;
            match items.get_mut(&key) {
                Some(slot) => {
                    let previous = std::mem::replace(slot, item);
                    Ok(((), Undo::Restore(key, previous)))
                }
                None => Err(StoreError::ConditionalCheckFailed {
                    table: table.to_string(),
                    key,
                }),
            }
        })
    }

    fn delete_returning(&self, table: &str, key: &str) -> StoreResult<Option<Item>> {
        self.mutate(table, |_, items| match items.remove(key) {
            Some(previous) => Ok((
                Some(previous.clone()),
                Undo::Restore(key.to_string(), previous),
            )),
            None => Ok((None, Undo::Nothing)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AttributeValue;
    use tempfile::TempDir;

    fn item(id: &str, memory: &str) -> Item {
        let mut item = Item::new();
        item.insert("server_id".to_string(), AttributeValue::S(id.to_string()));
        item.insert("memory".to_string(), AttributeValue::N(memory.to_string()));
        item
    }

    #[test]
    fn test_create_and_reopen() {
        let dir = TempDir::new().expect("Failed to create temp dir");

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.create_table("servers", "server_id").unwrap();
            store.put_if_absent("servers", item("A", "1")).unwrap();
            store.put_if_absent("servers", item("B", "2")).unwrap();
            store.delete_returning("servers", "B").unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.describe_table("servers").unwrap(), TableStatus::Active);
        assert_eq!(store.get_item("servers", "A").unwrap(), Some(item("A", "1")));
        assert_eq!(store.get_item("servers", "B").unwrap(), None);
        assert!(dir.path().join("servers.table.json").exists());
    }

    #[test]
    fn test_conditional_writes() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::open(dir.path()).unwrap();
        store.create_table("servers", "server_id").unwrap();

        store.put_if_absent("servers", item("A", "1")).unwrap();
        assert!(store
            .put_if_absent("servers", item("A", "2"))
            .unwrap_err()
            .is_conditional_check_failed());
        assert!(store
            .put_if_present("servers", item("B", "2"))
            .unwrap_err()
            .is_conditional_check_failed());

        store.put_if_present("servers", item("A", "3")).unwrap();
        assert_eq!(store.get_item("servers", "A").unwrap(), Some(item("A", "3")));
        assert_eq!(store.scan("servers").unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_table_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("servers.table.json"), b"{ not json").unwrap();

        assert!(matches!(
            FileStore::open(dir.path()),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_ignores_foreign_files() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("README.txt"), b"not a table").unwrap();
        std::fs::write(dir.path().join("notes.json"), b"{ stray, not json").unwrap();
        std::fs::write(dir.path().join(".table.json"), b"{}").unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.describe_table("README"),
            Err(StoreError::TableNotFound { .. })
        ));
        assert!(matches!(
            store.describe_table("notes"),
            Err(StoreError::TableNotFound { .. })
        ));
    }

    #[test]
    fn test_failed_persist_rolls_back() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::open(dir.path()).unwrap();
        store.create_table("servers", "server_id").unwrap();
        store.put_if_absent("servers", item("A", "1")).unwrap();

        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(dir.path().join("servers.table.json.tmp")).unwrap();

        assert!(matches!(
            store.put_if_present("servers", item("A", "2")),
            Err(StoreError::Persistence { .. })
        ));
        assert_eq!(store.get_item("servers", "A").unwrap(), Some(item("A", "1")));
    }
}
