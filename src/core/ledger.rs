//! Append-only JSONL trace ledger.
//!
//! Every authorized mutation lands here as one JSON object per line in
//! `.orchestration/agent_trace.jsonl`. Records are never rewritten or
//! removed; consumers tail new records by polling file length.
//!
//! Each append serializes the whole record to a buffer first and writes it
//! with a single append-mode call, so concurrent writers from other
//! processes interleave at whole-line granularity and a cancelled caller
//! can never leave a partial line behind. An in-process lock additionally
//! serializes appends from threads sharing this process.

use crate::core::error::GatehouseError;
use crate::core::intent::ORCHESTRATION_DIR;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

/// Ledger file name inside [`ORCHESTRATION_DIR`].
pub const TRACE_FILE: &str = "agent_trace.jsonl";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationClass {
    AstRefactor,
    IntentEvolution,
}

impl std::fmt::Display for MutationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AstRefactor => write!(f, "AST_REFACTOR"),
            Self::IntentEvolution => write!(f, "INTENT_EVOLUTION"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contributor {
    pub entity_type: String,
    pub model_identifier: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceFile {
    pub relative_path: String,
    pub content_hash: String,
    pub contributor: Contributor,
}

/// One audited mutation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Unique record identifier (ULID)
    pub id: String,
    /// RFC 3339 UTC
    pub timestamp: String,
    /// Intent bound when the mutation ran; never empty
    pub intent_id: String,
    /// Tool name (e.g. `write_to_file`)
    pub tool: String,
    pub mutation_class: MutationClass,
    /// Touched files; empty for unattributed command mutations
    pub files: Vec<TraceFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

/// Append-only writer/reader over the workspace trace ledger.
#[derive(Debug, Clone)]
pub struct TraceLedger {
    ledger_path: PathBuf,
}

impl TraceLedger {
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            ledger_path: workspace_root.join(ORCHESTRATION_DIR).join(TRACE_FILE),
        }
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Append one record as a single line. Creates directory and file on demand.
    pub fn append(&self, record: &TraceRecord) -> Result<(), GatehouseError> {
        let json = serde_json::to_string(record)
            .map_err(|e| GatehouseError::ValidationError(format!("trace record: {e}")))?;
        let mut buf = json.into_bytes();
        buf.push(b'\n');

        if let Some(parent) = self.ledger_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let append_lock = get_append_lock();
        let _guard = append_lock
            .lock()
            .map_err(|_| GatehouseError::Internal("ledger append lock poisoned".to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.ledger_path)?;
        file.write_all(&buf)?;
        Ok(())
    }

    /// Parse every non-empty line; blank lines are skipped.
    pub fn read_all(&self) -> Result<Vec<TraceRecord>, GatehouseError> {
        if !self.ledger_path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.ledger_path)?;
        let mut records = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(line).map_err(|e| {
                GatehouseError::LedgerCorrupt(format!(
                    "{} line {}: {e}",
                    self.ledger_path.display(),
                    idx + 1
                ))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    pub fn entries_for_intent(&self, intent_id: &str) -> Result<Vec<TraceRecord>, GatehouseError> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|record| record.intent_id == intent_id)
            .collect())
    }
}

fn get_append_lock() -> &'static Mutex<()> {
    static APPEND_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    APPEND_LOCK.get_or_init(|| Mutex::new(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::{new_record_id, now_rfc3339};

    fn sample_record(intent_id: &str, tool: &str) -> TraceRecord {
        TraceRecord {
            id: new_record_id(),
            timestamp: now_rfc3339(),
            intent_id: intent_id.to_string(),
            tool: tool.to_string(),
            mutation_class: MutationClass::AstRefactor,
            files: vec![TraceFile {
                relative_path: "src/api/weather.ts".to_string(),
                content_hash: "sha256:00".to_string(),
                contributor: Contributor {
                    entity_type: "AI".to_string(),
                    model_identifier: "unknown".to_string(),
                },
            }],
            elapsed_ms: Some(12),
        }
    }

    #[test]
    fn append_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TraceLedger::new(dir.path());

        let record = sample_record("INT-001", "write_to_file");
        ledger.append(&record).unwrap();

        let read = ledger.read_all().unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, record.id);
        assert_eq!(read[0].files, record.files);
        assert_eq!(read[0].elapsed_ms, Some(12));
    }

    #[test]
    fn records_are_one_line_each() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TraceLedger::new(dir.path());
        ledger.append(&sample_record("INT-001", "write_to_file")).unwrap();
        ledger.append(&sample_record("INT-002", "apply_diff")).unwrap();

        let raw = std::fs::read_to_string(ledger.ledger_path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.ends_with('\n'));
    }

    #[test]
    fn appends_preserve_existing_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TraceLedger::new(dir.path());
        ledger.append(&sample_record("INT-001", "write_to_file")).unwrap();
        let before = std::fs::read_to_string(ledger.ledger_path()).unwrap();

        ledger.append(&sample_record("INT-001", "apply_diff")).unwrap();
        let after = std::fs::read_to_string(ledger.ledger_path()).unwrap();
        assert!(after.starts_with(&before));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TraceLedger::new(dir.path());
        ledger.append(&sample_record("INT-001", "write_to_file")).unwrap();

        use std::io::Write as _;
        let mut file = OpenOptions::new()
            .append(true)
            .open(ledger.ledger_path())
            .unwrap();
        writeln!(file).unwrap();

        assert_eq!(ledger.read_all().unwrap().len(), 1);
    }

    #[test]
    fn corrupt_line_reads_as_ledger_corrupt_with_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TraceLedger::new(dir.path());
        ledger.append(&sample_record("INT-001", "write_to_file")).unwrap();

        use std::io::Write as _;
        let mut file = OpenOptions::new()
            .append(true)
            .open(ledger.ledger_path())
            .unwrap();
        writeln!(file, "{{not json").unwrap();

        let err = ledger.read_all().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("LEDGER_CORRUPT"), "{msg}");
        assert!(msg.contains("line 2"), "{msg}");
    }

    #[test]
    fn entries_for_intent_filters() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TraceLedger::new(dir.path());
        ledger.append(&sample_record("INT-001", "write_to_file")).unwrap();
        ledger.append(&sample_record("INT-002", "apply_diff")).unwrap();
        ledger.append(&sample_record("INT-001", "insert_content")).unwrap();

        let filtered = ledger.entries_for_intent("INT-001").unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.intent_id == "INT-001"));
    }

    #[test]
    fn concurrent_appends_interleave_at_line_granularity() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let root = root.clone();
                std::thread::spawn(move || {
                    let ledger = TraceLedger::new(&root);
                    for _ in 0..25 {
                        ledger
                            .append(&sample_record(&format!("INT-{worker:03}"), "write_to_file"))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let ledger = TraceLedger::new(&root);
        assert_eq!(ledger.read_all().unwrap().len(), 100);
    }
}
