// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! servmon Core Library
//!
//! Server inventory over a single key-value table. Provides the record
//! codec, the conditional-write inventory adapter, the store capability with
//! in-memory and file backends, one-time schema bootstrap, HTTP-style event
//! handling and configuration parsing.

pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod inventory;
pub mod record;
pub mod schema;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigLoader, GatewayConfig, StoreBackend};
pub use error::{HardValidationError, InventoryError, InventoryResult, StoreError, StoreResult};
pub use handler::{handle, handle_event, ApiEvent, ApiResponse, Operation, Request};
pub use inventory::ServerInventory;
pub use record::{Record, Value};
pub use schema::{ensure_schema, SchemaConfig, SchemaOutcome};
pub use store::{AttributeValue, FileStore, Item, KeyValueStore, MemoryStore, TableStatus};
pub use types::{Port, ServerId, TableName, KEY_FIELD};
