// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for servmon.
//!
//! Explicit enum error types only. No `Box<dyn Error>`, no `anyhow::Result`.
//! Expected negative outcomes of the inventory (record absent, record
//! already present) are NOT errors; they surface as `bool`/`Option` results.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Request Errors - Malformed Input at the Boundary
    // =========================================================================
    #[error("Malformed request body: {message}")]
    MalformedBody { message: String },

    #[error("Record is missing required key field '{field}'")]
    MissingKey { field: &'static str },

    #[error("Record key field '{field}' is invalid: {reason}")]
    InvalidKey { field: &'static str, reason: String },

    // =========================================================================
    // Store Errors - Propagated Unchanged, Never Retried
    // =========================================================================
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Table '{table}' did not become active within {waited_ms}ms")]
    SchemaNotReady { table: String, waited_ms: u64 },

    #[error("Table '{table}' was created but only {written} of {total} seed records were written: {source}")]
    SeedIncomplete {
        table: String,
        written: usize,
        total: usize,
        #[source]
        source: StoreError,
    },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors prevent startup.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid port: {port} - {reason}")]
    InvalidPort { port: u16, reason: String },

    #[error("Duplicate seed server_id: {id}")]
    DuplicateSeedId { id: String },
}

/// Faults raised by a key-value backend.
///
/// `ConditionalCheckFailed` is the only variant the inventory converts into a
/// boolean outcome; every other variant is a hard failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conditional check failed for key '{key}' in table '{table}'")]
    ConditionalCheckFailed { table: String, key: String },

    #[error("Requested resource not found: table '{table}'")]
    TableNotFound { table: String },

    #[error("Table already exists: {table}")]
    TableAlreadyExists { table: String },

    #[error("Table '{table}' is not active (status: {status})")]
    TableNotActive { table: String, status: &'static str },

    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Corrupt table file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Persistence failure: {context} - {source}")]
    Persistence {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Backend unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StoreError {
    /// Whether this is the store's existence-precondition failure.
    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(self, Self::ConditionalCheckFailed { .. })
    }
}

/// Result type alias using InventoryError.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Result type alias for backend operations.
pub type StoreResult<T> = Result<T, StoreError>;
