//! Error types for Gatehouse operations.
//!
//! This module defines the canonical error type used throughout Gatehouse.
//! All subsystems return `Result<T, GatehouseError>` for error handling.
//!
//! Stable uppercase tokens (`REGISTRY_UNREADABLE`, `LEDGER_CORRUPT`,
//! `PATH_INVALID`, `INTERNAL_ERROR`) are embedded in the `Display` output so
//! that hook reasons built from an error carry the token verbatim.

use std::io;
use thiserror::Error;

/// Canonical error type for all Gatehouse operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
/// I/O errors auto-convert via `#[from]`.
#[derive(Error, Debug)]
pub enum GatehouseError {
    /// I/O error (auto-converts from `std::io::Error`)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Intent registry exists but cannot be read as a well-formed document
    #[error("REGISTRY_UNREADABLE: {0}")]
    RegistryUnreadable(String),

    /// Trace ledger contains a line that does not parse as a record
    #[error("LEDGER_CORRUPT: {0}")]
    LedgerCorrupt(String),

    /// Path outside the workspace convention (absolute, `..`, missing)
    #[error("PATH_INVALID: {0}")]
    PathError(String),

    /// Structural or configuration validation failure
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Unexpected engine failure caught at the hook boundary
    #[error("INTERNAL_ERROR: {0}")]
    Internal(String),
}
