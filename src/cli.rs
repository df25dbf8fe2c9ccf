//! CLI struct definitions for the Gatehouse command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.
//! The CLI is a read-only inspection surface over the workspace sidecar
//! (`.orchestration/`): it never appends to the ledger and never binds
//! intents — session state is meaningful only inside a host-held engine.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "gatehouse",
    version = env!("CARGO_PKG_VERSION"),
    about = "Gatehouse is the deterministic governance gate between a coding agent and its file-mutating tools: intent handshakes, scoped mutation gates, freshness checks, append-only audit traces."
)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Scaffold the .orchestration/ sidecar with an empty intent registry
    #[clap(name = "init")]
    Init {
        /// Workspace directory (defaults to current working directory)
        #[clap(short, long)]
        dir: Option<PathBuf>,
    },

    /// Inspect the declared intent registry
    #[clap(name = "intents")]
    Intents(IntentsCli),

    /// Inspect the append-only mutation trace ledger
    #[clap(name = "trace")]
    Trace(TraceCli),

    /// Print the system-prompt fragment listing declared intents
    #[clap(name = "prompt")]
    Prompt {
        /// Workspace directory (defaults to current working directory)
        #[clap(short, long)]
        dir: Option<PathBuf>,
    },

    /// Print the select_active_intent tool schema as JSON
    #[clap(name = "schema")]
    Schema,
}

#[derive(clap::Args, Debug)]
pub(crate) struct IntentsCli {
    #[clap(subcommand)]
    pub command: IntentsCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum IntentsCommand {
    /// List declared intents (id, status, name)
    List {
        /// Workspace directory (defaults to current working directory)
        #[clap(short, long)]
        dir: Option<PathBuf>,
        /// Output format: 'text' or 'json'
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Show one intent, including its handshake context block
    Show {
        /// Workspace directory (defaults to current working directory)
        #[clap(short, long)]
        dir: Option<PathBuf>,
        /// Intent id to show
        #[clap(long)]
        id: String,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct TraceCli {
    #[clap(subcommand)]
    pub command: TraceCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum TraceCommand {
    /// Print the last N trace records as JSONL
    Export {
        /// Workspace directory (defaults to current working directory)
        #[clap(short, long)]
        dir: Option<PathBuf>,
        /// Number of most recent records to export
        #[clap(long, default_value = "10")]
        last: usize,
    },
    /// Print all records for one intent as JSONL
    ForIntent {
        /// Workspace directory (defaults to current working directory)
        #[clap(short, long)]
        dir: Option<PathBuf>,
        /// Intent id to filter on
        #[clap(long)]
        id: String,
    },
    /// Parse every ledger line and report corruption
    Verify {
        /// Workspace directory (defaults to current working directory)
        #[clap(short, long)]
        dir: Option<PathBuf>,
    },
}
