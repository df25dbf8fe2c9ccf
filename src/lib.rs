//! Gatehouse: deterministic governance middleware for AI coding agents.
//!
//! Gatehouse sits between a language-model agent and its file-mutating
//! tools. Before any mutation runs, the agent must bind its turn to a
//! declared *intent* (a scoped, constrained unit of work) via a handshake;
//! every mutation is then gated on scope membership and freshness, and
//! every completed mutation lands in an append-only audit ledger.
//!
//! # Architecture
//!
//! - **IntentStore** — `.orchestration/active_intents.yaml`, human-edited,
//!   read by the engine
//! - **TraceLedger** — `.orchestration/agent_trace.jsonl`, append-only,
//!   one JSON record per authorized mutation
//! - **FreshnessCache** — per-session fingerprints that detect out-of-band
//!   writes by other agents
//! - **ScopeMatcher** — deterministic glob matching over intent-owned paths
//! - **HookEngine** — orchestrates the handshake, the pre-hook gate, and
//!   post-hook trace emission
//!
//! The host embeds one [`core::engine::HookEngine`] per agent session and
//! calls `select_intent` / `pre_hook` / `post_hook` at the three well-known
//! points. The binary in this crate is a read-only inspection surface over
//! the same workspace sidecar:
//!
//! ```bash
//! # Scaffold the sidecar
//! gatehouse init
//!
//! # See what the agent is allowed to work on
//! gatehouse intents list
//!
//! # Audit what it did
//! gatehouse trace export --last 20
//!
//! # Wire the handshake tool into the host's toolset
//! gatehouse schema
//! ```

pub mod core;

mod cli;

use crate::cli::{Cli, Command, IntentsCommand, TraceCommand};
use crate::core::error::GatehouseError;
use crate::core::intent::IntentStore;
use crate::core::ledger::TraceLedger;
use crate::core::prompt;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

pub fn run() -> Result<(), GatehouseError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { dir } => run_init(resolve_dir(dir)?),
        Command::Intents(intents_cli) => match intents_cli.command {
            IntentsCommand::List { dir, format } => run_intents_list(resolve_dir(dir)?, &format),
            IntentsCommand::Show { dir, id } => run_intents_show(resolve_dir(dir)?, &id),
        },
        Command::Trace(trace_cli) => match trace_cli.command {
            TraceCommand::Export { dir, last } => run_trace_export(resolve_dir(dir)?, last),
            TraceCommand::ForIntent { dir, id } => run_trace_for_intent(resolve_dir(dir)?, &id),
            TraceCommand::Verify { dir } => run_trace_verify(resolve_dir(dir)?),
        },
        Command::Prompt { dir } => run_prompt(resolve_dir(dir)?),
        Command::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&prompt::select_intent_tool_schema())
                    .map_err(|e| GatehouseError::Internal(e.to_string()))?
            );
            Ok(())
        }
    }
}

fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf, GatehouseError> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}

fn run_init(root: PathBuf) -> Result<(), GatehouseError> {
    let store = IntentStore::new(&root);
    store.ensure()?;
    println!(
        "{} Intent registry ready at {}",
        "✓".bright_green(),
        store.registry_path().display()
    );
    Ok(())
}

fn run_intents_list(root: PathBuf, format: &str) -> Result<(), GatehouseError> {
    let intents = IntentStore::new(&root).load()?;
    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&intents)
                .map_err(|e| GatehouseError::Internal(e.to_string()))?
        );
        return Ok(());
    }

    if intents.is_empty() {
        println!("No intents declared.");
        return Ok(());
    }
    println!("{:<12} {:<13} NAME", "ID", "STATUS");
    for intent in &intents {
        println!(
            "{:<12} {:<13} {}",
            intent.id,
            intent.status.to_string(),
            intent.name
        );
    }
    Ok(())
}

fn run_intents_show(root: PathBuf, id: &str) -> Result<(), GatehouseError> {
    let store = IntentStore::new(&root);
    let Some(intent) = store.get_intent(id)? else {
        let available = store.list_intent_ids()?;
        return Err(GatehouseError::ValidationError(format!(
            "no intent with id '{id}' (available: {})",
            if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            }
        )));
    };
    println!("{}", prompt::intent_context_xml(&intent));
    Ok(())
}

fn run_trace_export(root: PathBuf, last: usize) -> Result<(), GatehouseError> {
    let records = TraceLedger::new(&root).read_all()?;
    let start = records.len().saturating_sub(last);
    for record in &records[start..] {
        println!(
            "{}",
            serde_json::to_string(record).map_err(|e| GatehouseError::Internal(e.to_string()))?
        );
    }
    Ok(())
}

fn run_trace_for_intent(root: PathBuf, id: &str) -> Result<(), GatehouseError> {
    let records = TraceLedger::new(&root).entries_for_intent(id)?;
    for record in &records {
        println!(
            "{}",
            serde_json::to_string(record).map_err(|e| GatehouseError::Internal(e.to_string()))?
        );
    }
    Ok(())
}

fn run_trace_verify(root: PathBuf) -> Result<(), GatehouseError> {
    let ledger = TraceLedger::new(&root);
    match ledger.read_all() {
        Ok(records) => {
            println!(
                "{} Ledger intact: {} records at {}",
                "✓".bright_green(),
                records.len(),
                ledger.ledger_path().display()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".bright_red(), e);
            Err(e)
        }
    }
}

fn run_prompt(root: PathBuf) -> Result<(), GatehouseError> {
    let ids = IntentStore::new(&root).list_intent_ids()?;
    print!("{}", prompt::prompt_fragment(&ids));
    Ok(())
}
