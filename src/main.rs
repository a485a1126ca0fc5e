// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowlog CLI entrypoint.
//!
//! Reads operations (a JSON array, or one operation per line) and prints their inverses,
//! their collaboration payloads, or the graph obtained by replaying them through a
//! session with undo/redo.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use flowlog::collab::CollaborativePayload;
use flowlog::history::DEFAULT_CAPACITY;
use flowlog::ops::decode_operations;
use flowlog::{
    invert, to_collaborative_payload, EditorSession, HistoryConfig, Operation, WorkflowGraph,
};

#[derive(Debug, Parser)]
#[command(name = "flowlog", version, about)]
struct Cli {
    /// Log library events at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the inverse of every operation.
    Invert { file: PathBuf },
    /// Print the collaboration message for every operation.
    Payload { file: PathBuf },
    /// Apply operations in order, optionally undo the last N, and print the final graph.
    Replay {
        file: PathBuf,
        /// Initial graph (JSON). Starts from an empty graph when omitted.
        #[arg(long)]
        graph: Option<PathBuf>,
        /// Number of undo steps to run after replaying.
        #[arg(long, default_value_t = 0)]
        undo: usize,
        /// Undo history capacity.
        #[arg(long, default_value_t = DEFAULT_CAPACITY)]
        capacity: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Invert { file } => {
            for operation in read_operations(&file)? {
                println!("{}", invert(&operation).to_json());
            }
        }
        Command::Payload { file } => {
            for operation in read_operations(&file)? {
                let message = to_collaborative_payload(&operation);
                println!("{}", serde_json::to_string(&message)?);
            }
        }
        Command::Replay {
            file,
            graph,
            undo,
            capacity,
        } => {
            let initial = match graph {
                Some(path) => read_graph(&path)?,
                None => WorkflowGraph::default(),
            };
            let operations = read_operations(&file)?;
            let config = HistoryConfig::with_capacity(capacity)?;
            let graph = replay(initial, operations, config, undo)?;
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_operations(path: &Path) -> Result<Vec<Operation>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    decode_operations(&raw).with_context(|| format!("failed to decode {}", path.display()))
}

fn read_graph(path: &Path) -> Result<WorkflowGraph> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid graph in {}", path.display()))
}

fn replay(
    initial: WorkflowGraph,
    operations: Vec<Operation>,
    config: HistoryConfig,
    undo: usize,
) -> Result<WorkflowGraph> {
    let (tx, mut rx) = mpsc::unbounded_channel::<CollaborativePayload>();
    let mut session = EditorSession::new(initial, config, tx);

    for (index, operation) in operations.into_iter().enumerate() {
        let kind = operation.kind();
        session
            .apply(operation)
            .with_context(|| format!("operation #{index} ({})", kind.as_str()))?;
    }
    for step in 0..undo {
        if session.undo()?.is_none() {
            bail!(
                "requested {undo} undo steps but history held only {step} (capacity {})",
                session.history().config().capacity
            );
        }
    }

    let mut broadcast = 0usize;
    while rx.try_recv().is_ok() {
        broadcast += 1;
    }
    tracing::info!(broadcast, "replay finished");
    Ok(session.into_graph())
}
