// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Workflow graph model.
//!
//! Blocks, edges and subflow containers plus the per-block field values the editor keeps
//! next to them. Operations carry snapshots of these types so they can be replayed and
//! reversed.

pub mod diff;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod graph;
pub mod ids;

pub use diff::{DiffAnalysis, EdgeDiff, FieldDiff};
pub use graph::{
    BlockSnapshot, EdgeSnapshot, FieldValues, Placement, Position, SubflowKind, SubflowSnapshot,
    WorkflowGraph,
};
pub use ids::{BlockId, EdgeId, EntryId, Id, IdError, SubflowId};
