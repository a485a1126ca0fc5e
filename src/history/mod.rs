// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bounded undo/redo log over [`OperationEntry`] records.
//!
//! A `History` belongs to one editor session. It never synchronizes with peers: each
//! collaborator keeps its own log over the shared graph.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{EntryId, WorkflowGraph};
use crate::ops::{
    apply_operation, create_operation_entry, invert, ApplyError, Delta, Operation, OperationEntry,
};

pub const DEFAULT_CAPACITY: usize = 100;

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum number of undoable entries; the oldest are evicted first.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl HistoryConfig {
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        let config = Self { capacity };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("history capacity must be at least 1")]
    ZeroCapacity,
    #[error("invalid history config: {0}")]
    Parse(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Execute,
    Undo,
    Redo,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Execute => "execute",
            Self::Undo => "undo",
            Self::Redo => "redo",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("{step} failed: {source}")]
    Apply {
        step: StepKind,
        #[source]
        source: ApplyError,
    },
}

/// Result of one successful execute, undo or redo.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub entry_id: EntryId,
    /// The operation that actually ran against the graph (the inverse, for undo).
    pub applied: Operation,
    pub delta: Delta,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    config: HistoryConfig,
    undo: VecDeque<OperationEntry>,
    redo: Vec<OperationEntry>,
}

impl History {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Pushes an already-applied edit. Clears the redo log and evicts past capacity.
    pub fn record(&mut self, entry: OperationEntry) {
        tracing::debug!(
            entry = %entry.id(),
            kind = entry.operation().kind().as_str(),
            "recorded operation"
        );
        self.undo.push_back(entry);
        self.redo.clear();

        let capacity = self.config.capacity.max(1);
        while self.undo.len() > capacity {
            if let Some(evicted) = self.undo.pop_front() {
                tracing::trace!(entry = %evicted.id(), "evicted oldest history entry");
            }
        }
    }

    /// Captures snapshots for `operation`, applies it and records it with its inverse.
    ///
    /// Nothing is recorded when the apply fails.
    pub fn execute(
        &mut self,
        graph: &mut WorkflowGraph,
        mut operation: Operation,
    ) -> Result<Step, HistoryError> {
        operation.capture_snapshots(graph);
        let inverse = invert(&operation);
        let delta = apply_operation(graph, &operation).map_err(|source| {
            tracing::warn!(kind = operation.kind().as_str(), error = %source, "apply failed");
            HistoryError::Apply {
                step: StepKind::Execute,
                source,
            }
        })?;

        let applied = operation.clone();
        let entry = create_operation_entry(operation, inverse);
        let entry_id = entry.id().clone();
        self.record(entry);
        Ok(Step {
            entry_id,
            applied,
            delta,
        })
    }

    /// Reverts the newest entry. `Ok(None)` when there is nothing to undo.
    ///
    /// On failure the entry stays on the undo log and the graph is unchanged.
    pub fn undo(&mut self, graph: &mut WorkflowGraph) -> Result<Option<Step>, HistoryError> {
        let Some(entry) = self.undo.pop_back() else {
            return Ok(None);
        };
        match apply_operation(graph, entry.inverse()) {
            Ok(delta) => {
                tracing::debug!(
                    entry = %entry.id(),
                    kind = entry.inverse().kind().as_str(),
                    "undo"
                );
                let step = Step {
                    entry_id: entry.id().clone(),
                    applied: entry.inverse().clone(),
                    delta,
                };
                self.redo.push(entry);
                Ok(Some(step))
            }
            Err(source) => {
                tracing::warn!(entry = %entry.id(), error = %source, "undo failed");
                self.undo.push_back(entry);
                Err(HistoryError::Apply {
                    step: StepKind::Undo,
                    source,
                })
            }
        }
    }

    /// Re-applies the most recently undone entry. `Ok(None)` when there is nothing to redo.
    pub fn redo(&mut self, graph: &mut WorkflowGraph) -> Result<Option<Step>, HistoryError> {
        let Some(entry) = self.redo.pop() else {
            return Ok(None);
        };
        match apply_operation(graph, entry.operation()) {
            Ok(delta) => {
                tracing::debug!(
                    entry = %entry.id(),
                    kind = entry.operation().kind().as_str(),
                    "redo"
                );
                let step = Step {
                    entry_id: entry.id().clone(),
                    applied: entry.operation().clone(),
                    delta,
                };
                self.undo.push_back(entry);
                Ok(Some(step))
            }
            Err(source) => {
                tracing::warn!(entry = %entry.id(), error = %source, "redo failed");
                self.redo.push(entry);
                Err(HistoryError::Apply {
                    step: StepKind::Redo,
                    source,
                })
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Next entry `undo` would revert.
    pub fn peek_undo(&self) -> Option<&OperationEntry> {
        self.undo.back()
    }

    pub fn peek_redo(&self) -> Option<&OperationEntry> {
        self.redo.last()
    }

    /// Undoable entries, oldest first.
    pub fn undo_entries(&self) -> impl Iterator<Item = &OperationEntry> {
        self.undo.iter()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
