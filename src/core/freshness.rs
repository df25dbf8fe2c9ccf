//! Per-session freshness tracking for workspace files.
//!
//! The cache remembers the last fingerprint the engine observed for each
//! path it authorized an operation on. It detects out-of-band writes by
//! other agents; it does not prevent them. Entries live only inside one
//! engine instance and are never persisted or shared between processes.

use crate::core::error::GatehouseError;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Fingerprint sentinel for a path that does not exist on disk.
pub const ABSENT: &str = "ABSENT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Current on-disk fingerprint equals the stored one.
    Fresh,
    /// On-disk content diverged from the last observed fingerprint.
    Stale,
    /// No entry exists for this path yet (first touch this session).
    Unknown,
}

/// `sha256:` + lowercase hex over the raw bytes.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// Fingerprint the file at `abs_path`, or [`ABSENT`] if it does not exist.
pub fn fingerprint_path(abs_path: &Path) -> Result<String, GatehouseError> {
    match std::fs::read(abs_path) {
        Ok(bytes) => Ok(fingerprint_bytes(&bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(ABSENT.to_string()),
        Err(e) => Err(GatehouseError::IoError(e)),
    }
}

/// Session-local map from workspace-relative path to last observed fingerprint.
#[derive(Debug)]
pub struct FreshnessCache {
    workspace_root: PathBuf,
    entries: HashMap<String, String>,
}

impl FreshnessCache {
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            workspace_root: workspace_root.to_path_buf(),
            entries: HashMap::new(),
        }
    }

    /// Compute and store the current on-disk fingerprint for `rel_path`.
    pub fn observe(&mut self, rel_path: &str) -> Result<(), GatehouseError> {
        let fingerprint = fingerprint_path(&self.workspace_root.join(rel_path))?;
        self.entries.insert(rel_path.to_string(), fingerprint);
        Ok(())
    }

    /// Store a fingerprint computed elsewhere (post-hook already hashed the file).
    pub fn record(&mut self, rel_path: &str, fingerprint: String) {
        self.entries.insert(rel_path.to_string(), fingerprint);
    }

    /// Compare the current on-disk fingerprint against the stored entry.
    pub fn check(&self, rel_path: &str) -> Result<Freshness, GatehouseError> {
        let Some(stored) = self.entries.get(rel_path) else {
            return Ok(Freshness::Unknown);
        };
        let current = fingerprint_path(&self.workspace_root.join(rel_path))?;
        if &current == stored {
            Ok(Freshness::Fresh)
        } else {
            Ok(Freshness::Stale)
        }
    }
}
