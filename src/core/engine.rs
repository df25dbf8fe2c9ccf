//! Hook engine: handshake, pre-hook gate, post-hook trace emission.
//!
//! One engine instance belongs to one agent session. The host calls
//! `select_intent` when the model invokes the handshake tool, `pre_hook`
//! immediately before any governed tool executes, and `post_hook` after a
//! mutation completed. Session state is the bound intent id and the
//! freshness cache; both die with the engine.
//!
//! The pre-hook never raises into the host tool path: internal failures and
//! panics surface as blocking decisions (fail closed). The post-hook
//! returns an error only when the audit record could not be written, since
//! the mutation itself cannot be rolled back.

use crate::core::classify;
use crate::core::config;
use crate::core::error::GatehouseError;
use crate::core::freshness::{self, Freshness, FreshnessCache};
use crate::core::intent::IntentStore;
use crate::core::ledger::{Contributor, MutationClass, TraceFile, TraceLedger, TraceRecord};
use crate::core::prompt;
use crate::core::scope;
use crate::core::time::{new_record_id, now_rfc3339};
use crate::core::tools::{self, ToolClass, ToolTable};
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Outcome of a pre-hook gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl HookDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Per-session governance engine over one workspace.
pub struct HookEngine {
    workspace_root: PathBuf,
    store: IntentStore,
    ledger: TraceLedger,
    freshness: FreshnessCache,
    tools: ToolTable,
    active_intent_id: Option<String>,
    model_identifier: String,
}

impl HookEngine {
    /// Build an engine for one agent session. Reads the optional workspace
    /// config; a malformed config is a construction error (fail closed).
    pub fn new(workspace_root: &Path) -> Result<Self, GatehouseError> {
        let cfg = config::load_config(workspace_root)?;
        let model_identifier = cfg
            .model_identifier
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self {
            store: IntentStore::new(workspace_root),
            ledger: TraceLedger::new(workspace_root),
            freshness: FreshnessCache::new(workspace_root),
            tools: ToolTable::from_config(&cfg),
            workspace_root: workspace_root.to_path_buf(),
            active_intent_id: None,
            model_identifier,
        })
    }

    /// Override the contributor model id recorded in trace records.
    pub fn with_model_identifier(mut self, model_identifier: impl Into<String>) -> Self {
        self.model_identifier = model_identifier.into();
        self
    }

    pub fn active_intent_id(&self) -> Option<&str> {
        self.active_intent_id.as_deref()
    }

    /// Canned system-prompt fragment listing the declared intent ids.
    pub fn prompt_fragment(&self) -> Result<String, GatehouseError> {
        Ok(prompt::prompt_fragment(&self.store.list_intent_ids()?))
    }

    /// Handshake: bind the session to a declared intent.
    ///
    /// Returns the `<intent_context>` XML block on success. On a miss or a
    /// registry failure the bound intent is left unchanged and an `ERROR`
    /// string is returned for the model to self-correct on.
    pub fn select_intent(&mut self, id: &str) -> String {
        match self.store.get_intent(id) {
            Ok(Some(intent)) => {
                self.active_intent_id = Some(intent.id.clone());
                prompt::intent_context_xml(&intent)
            }
            Ok(None) => {
                let available = self.store.list_intent_ids().unwrap_or_default();
                if available.is_empty() {
                    format!(
                        "ERROR: INTENT_NOT_FOUND: no intent with id '{id}'; the registry declares no intents"
                    )
                } else {
                    format!(
                        "ERROR: INTENT_NOT_FOUND: no intent with id '{id}'; available intent ids: {}",
                        available.join(", ")
                    )
                }
            }
            Err(e) => format!("ERROR: {e}"),
        }
    }

    /// Gate a tool call. Never panics and never raises into the host: every
    /// failure mode folds into a blocking decision.
    pub fn pre_hook(&mut self, tool: &str, params: &Value) -> HookDecision {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.pre_hook_inner(tool, params)));
        match outcome {
            Ok(decision) => decision,
            Err(_) => HookDecision::block(format!(
                "INTERNAL_ERROR: hook engine panicked while gating '{tool}'"
            )),
        }
    }

    fn pre_hook_inner(&mut self, tool: &str, params: &Value) -> HookDecision {
        let class = self.tools.classify(tool);
        if class == ToolClass::Safe {
            return HookDecision::allow();
        }

        let Some(active_id) = self.active_intent_id.clone() else {
            return HookDecision::block(format!(
                "INTENT_REQUIRED: tool '{tool}' mutates the workspace but no intent is bound \
                 to this session. Call `select_active_intent` with a declared intent id first."
            ));
        };

        let intent = match self.store.get_intent(&active_id) {
            Ok(Some(intent)) => intent,
            Ok(None) => {
                return HookDecision::block(format!(
                    "INTENT_NOT_FOUND: active intent '{active_id}' is no longer present in the \
                     registry; re-run `select_active_intent` with a declared id"
                ));
            }
            Err(e) => {
                return HookDecision::block(format!(
                    "{e}; no mutating tool is allowed while the registry is unreadable"
                ));
            }
        };

        if class == ToolClass::CommandMutation {
            // Commands cannot be pinned to one path; admit under the bound
            // intent and let the post-hook record an unattributed mutation.
            return HookDecision::allow();
        }

        let rel_path = match tools::extract_path(params) {
            Some(raw) => match scope::normalize_rel_path(raw) {
                Ok(path) => path,
                Err(e) => return HookDecision::block(e.to_string()),
            },
            None => {
                return HookDecision::block(format!(
                    "PATH_INVALID: tool '{tool}' did not supply a `path` parameter"
                ));
            }
        };

        if !scope::in_scope(&rel_path, &intent.owned_scope) {
            return HookDecision::block(format!(
                "SCOPE_VIOLATION: path '{rel_path}' is outside the owned scope of intent '{}' \
                 (owned_scope: [{}])",
                intent.id,
                intent.owned_scope.join(", ")
            ));
        }

        match self.freshness.check(&rel_path) {
            Ok(Freshness::Stale) => {
                return HookDecision::block(format!(
                    "STALE_FILE: '{rel_path}' changed on disk since this session last observed \
                     it. Re-read the file before retrying."
                ));
            }
            Ok(Freshness::Fresh) | Ok(Freshness::Unknown) => {}
            Err(e) => {
                return HookDecision::block(format!(
                    "INTERNAL_ERROR: freshness check failed for '{rel_path}': {e}"
                ));
            }
        }

        // Baseline for the post-write comparison is the pre-write state.
        if let Err(e) = self.freshness.observe(&rel_path) {
            return HookDecision::block(format!(
                "INTERNAL_ERROR: could not fingerprint '{rel_path}': {e}"
            ));
        }

        HookDecision::allow()
    }

    /// Record an authorized mutation in the trace ledger and refresh the
    /// session fingerprint. Only called after the external tool ran; the
    /// tool's own `result` payload does not influence the record, which is
    /// built from post-write disk state.
    pub fn post_hook(
        &mut self,
        tool: &str,
        params: &Value,
        _result: &Value,
        elapsed_ms: Option<u64>,
    ) -> Result<(), GatehouseError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.post_hook_inner(tool, params, elapsed_ms)
        }));
        match outcome {
            Ok(result) => result,
            Err(_) => Err(GatehouseError::Internal(format!(
                "hook engine panicked while recording '{tool}'"
            ))),
        }
    }

    fn post_hook_inner(
        &mut self,
        tool: &str,
        params: &Value,
        elapsed_ms: Option<u64>,
    ) -> Result<(), GatehouseError> {
        let class = self.tools.classify(tool);
        if class == ToolClass::Safe {
            return Ok(());
        }

        let intent_id = self.active_intent_id.clone().ok_or_else(|| {
            GatehouseError::Internal(format!(
                "post-hook for '{tool}' reached without a bound intent"
            ))
        })?;

        let mut files = Vec::new();
        let mut mutation_class = MutationClass::AstRefactor;
        let mut observed: Option<(String, String)> = None;

        if class == ToolClass::PathMutation {
            let raw = tools::extract_path(params).ok_or_else(|| {
                GatehouseError::PathError(format!("tool '{tool}' did not supply a `path` parameter"))
            })?;
            let rel_path = scope::normalize_rel_path(raw)?;
            let abs_path = self.workspace_root.join(&rel_path);
            let content_hash = freshness::fingerprint_path(&abs_path)?;
            let content = std::fs::read(&abs_path)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            mutation_class = classify::classify(&content);
            files.push(TraceFile {
                relative_path: rel_path.clone(),
                content_hash: content_hash.clone(),
                contributor: Contributor {
                    entity_type: "AI".to_string(),
                    model_identifier: self.model_identifier.clone(),
                },
            });
            observed = Some((rel_path, content_hash));
        }

        let record = TraceRecord {
            id: new_record_id(),
            timestamp: now_rfc3339(),
            intent_id,
            tool: tool.to_string(),
            mutation_class,
            files,
            elapsed_ms,
        };
        self.ledger.append(&record)?;

        // Ledger durability comes first; a lost cache update fails safe as a
        // spurious STALE_FILE on the next attempt.
        if let Some((rel_path, fingerprint)) = observed {
            self.freshness.record(&rel_path, fingerprint);
        }
        Ok(())
    }
}
