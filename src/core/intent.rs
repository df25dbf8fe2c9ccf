//! Workspace intent registry.
//!
//! Intents are declared by humans in `.orchestration/active_intents.yaml`
//! and read by the engine. The registry is the source of truth for what an
//! agent is allowed to touch: each intent carries an `owned_scope` glob set,
//! free-form constraints, and acceptance criteria that are surfaced verbatim
//! during the handshake.
//!
//! Parser tolerance: unknown keys are ignored and missing list fields read
//! as empty. Structural violations (non-list `owned_scope`, duplicate or
//! empty ids, non-YAML content) read as `REGISTRY_UNREADABLE` and the
//! engine fails closed.

use crate::core::error::GatehouseError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Workspace-relative sidecar directory shared by all Gatehouse artifacts.
pub const ORCHESTRATION_DIR: &str = ".orchestration";

/// Registry file name inside [`ORCHESTRATION_DIR`].
pub const REGISTRY_FILE: &str = "active_intents.yaml";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    #[default]
    Pending,
    InProgress,
    Blocked,
    Done,
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Blocked => write!(f, "BLOCKED"),
            Self::Done => write!(f, "DONE"),
        }
    }
}

/// A declared, scoped unit of work an agent can bind its turn to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Intent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: IntentStatus,
    #[serde(default)]
    pub owned_scope: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryDoc {
    #[serde(default)]
    active_intents: Vec<Intent>,
}

/// Reader for the workspace intent registry.
#[derive(Debug, Clone)]
pub struct IntentStore {
    registry_path: PathBuf,
}

impl IntentStore {
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            registry_path: workspace_root.join(ORCHESTRATION_DIR).join(REGISTRY_FILE),
        }
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    /// Create an empty `active_intents: []` registry if absent. Idempotent.
    pub fn ensure(&self) -> Result<(), GatehouseError> {
        if self.registry_path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.registry_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.registry_path, "active_intents: []\n")?;
        Ok(())
    }

    /// Parse the registry, creating it empty on first read.
    pub fn load(&self) -> Result<Vec<Intent>, GatehouseError> {
        self.ensure()?;
        let contents = fs::read_to_string(&self.registry_path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        let doc: RegistryDoc = serde_yaml::from_str(&contents).map_err(|e| {
            GatehouseError::RegistryUnreadable(format!(
                "{}: {e}",
                self.registry_path.display()
            ))
        })?;
        validate_intents(&doc.active_intents)?;
        Ok(doc.active_intents)
    }

    /// Return the intent whose `id` matches exactly, else `None`.
    pub fn get_intent(&self, id: &str) -> Result<Option<Intent>, GatehouseError> {
        Ok(self.load()?.into_iter().find(|intent| intent.id == id))
    }

    /// All intent ids in registry order.
    pub fn list_intent_ids(&self) -> Result<Vec<String>, GatehouseError> {
        Ok(self.load()?.into_iter().map(|intent| intent.id).collect())
    }
}

fn validate_intents(intents: &[Intent]) -> Result<(), GatehouseError> {
    let mut seen = HashSet::new();
    for intent in intents {
        if intent.id.trim().is_empty() {
            return Err(GatehouseError::RegistryUnreadable(
                "intent with empty id".to_string(),
            ));
        }
        if !seen.insert(intent.id.as_str()) {
            return Err(GatehouseError::RegistryUnreadable(format!(
                "duplicate intent id '{}'",
                intent.id
            )));
        }
    }
    Ok(())
}
