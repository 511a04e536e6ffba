// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Validates gateway, store, table and seed settings at boot-up time.
//! Any invalid field results in a HardValidationError that prevents startup.

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{HardValidationError, InventoryError, InventoryResult};
use crate::record::Record;
use crate::schema::SchemaConfig;
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::types::{Port, TableName};

/// Raw gateway configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawGatewayConfig {
    #[serde(default = "default_bind_address")]
    bind_address: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    metrics_port: Option<u16>,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for RawGatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            metrics_port: None,
        }
    }
}

/// Raw store configuration.
#[derive(Debug, Deserialize)]
struct RawStoreConfig {
    #[serde(default = "default_backend")]
    backend: String,
    #[serde(default)]
    data_dir: Option<String>,
    #[serde(default)]
    activation_lag: u32,
}

fn default_backend() -> String {
    "memory".to_string()
}

impl Default for RawStoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: None,
            activation_lag: 0,
        }
    }
}

/// Raw table configuration.
#[derive(Debug, Deserialize)]
struct RawTableConfig {
    #[serde(default = "default_table_name")]
    name: String,
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    #[serde(default = "default_ready_timeout_ms")]
    ready_timeout_ms: u64,
}

fn default_table_name() -> String {
    "servers".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_ready_timeout_ms() -> u64 {
    30_000
}

impl Default for RawTableConfig {
    fn default() -> Self {
        Self {
            name: default_table_name(),
            poll_interval_ms: default_poll_interval_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    gateway: RawGatewayConfig,
    #[serde(default)]
    store: RawStoreConfig,
    #[serde(default)]
    table: RawTableConfig,
    #[serde(default)]
    seed: Vec<Record>,
}

/// Validated gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_address: IpAddr,
    pub port: Port,
    pub metrics_port: Option<Port>,
}

impl GatewayConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port.value())
    }
}

/// Validated store backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory { activation_lag: u32 },
    File { data_dir: PathBuf },
}

impl StoreBackend {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Memory { .. } => "memory",
            Self::File { .. } => "file",
        }
    }

    /// Instantiate the configured backend.
    pub fn open(&self) -> InventoryResult<Arc<dyn KeyValueStore>> {
        let store: Arc<dyn KeyValueStore> = match self {
            Self::Memory { activation_lag } => {
                Arc::new(MemoryStore::with_activation_lag(*activation_lag))
            }
            Self::File { data_dir } => Arc::new(FileStore::open(data_dir)?),
        };
        Ok(store)
    }
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub store: StoreBackend,
    pub schema: SchemaConfig,
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> InventoryResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InventoryError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| InventoryError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> InventoryResult<Config> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| InventoryError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> InventoryResult<Config> {
        let gateway = Self::validate_gateway(raw.gateway)?;
        let store = Self::validate_store(raw.store)?;
        let mut schema = Self::validate_table(raw.table)?;
        schema.seed = Self::validate_seed(raw.seed)?;

        Ok(Config {
            gateway,
            store,
            schema,
        })
    }

    fn validate_gateway(raw: RawGatewayConfig) -> InventoryResult<GatewayConfig> {
        let bind_address: IpAddr =
            raw.bind_address
                .parse()
                .map_err(|_| HardValidationError::InvalidFieldValue {
                    field: "gateway.bind_address",
                    value: raw.bind_address.clone(),
                    reason: "Must be an IPv4 or IPv6 address".to_string(),
                })?;

        let port = Port::new(raw.port)?;
        let metrics_port = raw.metrics_port.map(Port::new).transpose()?;

        if metrics_port == Some(port) {
            return Err(HardValidationError::InvalidPort {
                port: port.value(),
                reason: "Metrics port must differ from the gateway port".to_string(),
            }
            .into());
        }

        Ok(GatewayConfig {
            bind_address,
            port,
            metrics_port,
        })
    }

    fn validate_store(raw: RawStoreConfig) -> InventoryResult<StoreBackend> {
        match raw.backend.as_str() {
            "memory" => Ok(StoreBackend::Memory {
                activation_lag: raw.activation_lag,
            }),
            "file" => {
                let data_dir = raw
                    .data_dir
                    .filter(|dir| !dir.trim().is_empty())
                    .ok_or_else(|| HardValidationError::MissingRequiredField {
                        field: "data_dir",
                        context: "store backend 'file'".to_string(),
                    })?;
                Ok(StoreBackend::File {
                    data_dir: PathBuf::from(data_dir),
                })
            }
            other => Err(HardValidationError::InvalidFieldValue {
                field: "store.backend",
                value: other.to_string(),
                reason: "Must be one of: memory, file".to_string(),
            }
            .into()),
        }
    }

    fn validate_table(raw: RawTableConfig) -> InventoryResult<SchemaConfig> {
        let table = TableName::new(raw.name)?;

        if raw.ready_timeout_ms == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "table.ready_timeout_ms",
                value: "0".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            }
            .into());
        }

        if raw.poll_interval_ms == 0 || raw.poll_interval_ms > raw.ready_timeout_ms {
            return Err(HardValidationError::InvalidFieldValue {
                field: "table.poll_interval_ms",
                value: raw.poll_interval_ms.to_string(),
                reason: format!(
                    "Must be between 1 and ready_timeout_ms ({})",
                    raw.ready_timeout_ms
                ),
            }
            .into());
        }

        Ok(SchemaConfig {
            poll_interval: Duration::from_millis(raw.poll_interval_ms),
            ready_timeout: Duration::from_millis(raw.ready_timeout_ms),
            ..SchemaConfig::new(table)
        })
    }

    fn validate_seed(seed: Vec<Record>) -> InventoryResult<Vec<Record>> {
        let mut seen_ids = HashSet::new();

        for (index, record) in seed.iter().enumerate() {
            let id = record.server_id().map_err(|e| HardValidationError::InvalidFieldValue {
                field: "seed",
                value: format!("record at index {}", index),
                reason: e.to_string(),
            })?;

            if !seen_ids.insert(id.clone()) {
                return Err(HardValidationError::DuplicateSeedId { id: id.to_string() }.into());
            }
        }

        Ok(seed)
    }
}
