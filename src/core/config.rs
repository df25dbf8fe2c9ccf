//! Optional engine configuration from `.orchestration/config.yaml`.
//!
//! A missing file yields the defaults; a malformed file is a hard error at
//! engine construction so a misconfigured workspace fails closed rather
//! than running with half-applied governance.

use crate::core::error::GatehouseError;
use crate::core::intent::ORCHESTRATION_DIR;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Config file name inside [`ORCHESTRATION_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GovernanceConfig {
    /// Default contributor model id when the host supplies none.
    #[serde(default)]
    pub model_identifier: Option<String>,
    /// Additional tool names gated as path-bearing mutations
    /// (path extracted from `params.path`).
    #[serde(default)]
    pub extra_mutating_tools: Vec<String>,
    /// Additional tool names admitted without an intent.
    #[serde(default)]
    pub extra_safe_tools: Vec<String>,
}

pub fn load_config(workspace_root: &Path) -> Result<GovernanceConfig, GatehouseError> {
    let path = workspace_root.join(ORCHESTRATION_DIR).join(CONFIG_FILE);
    if !path.exists() {
        return Ok(GovernanceConfig::default());
    }
    let contents = fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(GovernanceConfig::default());
    }
    serde_yaml::from_str(&contents)
        .map_err(|e| GatehouseError::RegistryUnreadable(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert!(cfg.model_identifier.is_none());
        assert!(cfg.extra_mutating_tools.is_empty());
    }

    #[test]
    fn fields_parse_and_unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(ORCHESTRATION_DIR)).unwrap();
        fs::write(
            dir.path().join(ORCHESTRATION_DIR).join(CONFIG_FILE),
            "model_identifier: claude-sonnet\nextra_mutating_tools: [edit_notebook]\nfuture_knob: true\n",
        )
        .unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.model_identifier.as_deref(), Some("claude-sonnet"));
        assert_eq!(cfg.extra_mutating_tools, vec!["edit_notebook"]);
    }

    #[test]
    fn malformed_config_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(ORCHESTRATION_DIR)).unwrap();
        fs::write(
            dir.path().join(ORCHESTRATION_DIR).join(CONFIG_FILE),
            "extra_mutating_tools: not-a-list-",
        )
        .unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(err.to_string().contains("REGISTRY_UNREADABLE"), "{err}");
    }
}
