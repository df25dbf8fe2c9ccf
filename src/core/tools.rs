//! Tool classification table.
//!
//! The dispatcher consults this table before and after every tool call.
//! Safe tools are read-only discovery surfaces and pass ungated; mutating
//! tools are gated on an active intent, scope, and freshness. Tools the
//! table does not know about are not governed (the host's dispatcher wraps
//! known mutating tools only); new governed tools are added via
//! `extra_mutating_tools` / `extra_safe_tools` in the workspace config.

use crate::core::config::GovernanceConfig;
use serde_json::Value;
use std::collections::HashSet;

/// Name of the handshake tool exposed to the language model.
pub const SELECT_ACTIVE_INTENT: &str = "select_active_intent";

/// Read-only discovery tools, always admitted without an intent.
pub const SAFE_TOOLS: &[&str] = &[
    "read_file",
    "list_files",
    "list_code_definition_names",
    "search_files",
    "browser_action",
    "ask_followup_question",
    "attempt_completion",
];

/// Gated tools that mutate exactly one workspace path (`params.path`).
pub const PATH_MUTATING_TOOLS: &[&str] = &[
    "write_to_file",
    "apply_diff",
    "insert_content",
    "search_and_replace",
];

/// Gated tools whose effects cannot be attributed to a single path.
pub const COMMAND_TOOLS: &[&str] = &["execute_command"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolClass {
    /// Ungated; never reaches scope or freshness checks.
    Safe,
    /// Gated; target path extracted from `params.path`.
    PathMutation,
    /// Gated on an active intent only; recorded as an unattributed mutation.
    CommandMutation,
}

#[derive(Debug, Clone)]
pub struct ToolTable {
    safe: HashSet<String>,
    path_mutating: HashSet<String>,
    command: HashSet<String>,
}

impl ToolTable {
    pub fn with_defaults() -> Self {
        Self::from_config(&GovernanceConfig::default())
    }

    pub fn from_config(config: &GovernanceConfig) -> Self {
        let mut safe: HashSet<String> = SAFE_TOOLS.iter().map(|t| t.to_string()).collect();
        safe.extend(config.extra_safe_tools.iter().cloned());

        let mut path_mutating: HashSet<String> =
            PATH_MUTATING_TOOLS.iter().map(|t| t.to_string()).collect();
        path_mutating.extend(config.extra_mutating_tools.iter().cloned());

        let command: HashSet<String> = COMMAND_TOOLS.iter().map(|t| t.to_string()).collect();

        Self {
            safe,
            path_mutating,
            command,
        }
    }

    /// Classify a tool name. An explicit safe entry wins over a mutating one.
    pub fn classify(&self, tool: &str) -> ToolClass {
        if self.safe.contains(tool) {
            return ToolClass::Safe;
        }
        if self.command.contains(tool) {
            return ToolClass::CommandMutation;
        }
        if self.path_mutating.contains(tool) {
            return ToolClass::PathMutation;
        }
        ToolClass::Safe
    }
}

/// Extract the target path from a path-bearing tool's params.
pub fn extract_path(params: &Value) -> Option<&str> {
    params.get("path").and_then(Value::as_str)
}
