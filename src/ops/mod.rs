// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reversible edit operations over a workflow graph.
//!
//! Every graph-mutating editor gesture is described by one [`Operation`]. Each variant
//! carries enough data to replay it and to derive its inverse ([`invert`]). Operations are
//! applied atomically and produce a coarse [`Delta`] the editor can use to refresh derived
//! state.
//!
//! The variant set is closed: [`invert`], [`crate::collab::to_collaborative_payload`],
//! [`Operation::kind`] and the apply loop all match exhaustively, so a new variant does not
//! build until every one of them handles it.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{EnumIter, IntoStaticStr};
use thiserror::Error;

use crate::model::{
    BlockId, BlockSnapshot, DiffAnalysis, EdgeId, EdgeSnapshot, FieldValues, Placement, Position,
    SubflowId, SubflowSnapshot, WorkflowGraph,
};

mod capture;
pub mod entry;
mod invert;

pub use entry::{create_operation_entry, OperationEntry};
pub use invert::invert;

/// One atomic, reversible edit.
///
/// Wire shape: `{"type": "<kebab-case tag>", "data": {...camelCase fields}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum Operation {
    AddBlock(BlockData),
    RemoveBlock(BlockData),
    BatchAddBlocks(BatchBlocksData),
    BatchRemoveBlocks(BatchBlocksData),
    AddEdge(EdgeData),
    RemoveEdge(EdgeData),
    BatchAddEdges(BatchEdgesData),
    BatchRemoveEdges(BatchEdgesData),
    AddSubflow(SubflowData),
    RemoveSubflow(SubflowData),
    MoveBlock(MoveBlockData),
    MoveSubflow(MoveSubflowData),
    BatchMoveBlocks(BatchMoveData),
    DuplicateBlock(DuplicateBlockData),
    UpdateParent(UpdateParentData),
    BatchUpdateParent(BatchUpdateParentData),
    ApplyDiff(ApplyDiffData),
    AcceptDiff(AcceptDiffData),
    RejectDiff(RejectDiffData),
    BatchToggleEnabled(BatchToggleData),
    BatchToggleHandles(BatchToggleData),
    BatchToggleLocked(BatchToggleData),
}

/// Tag-only mirror of [`Operation`], used for wire decoding and for enumerating variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum OperationKind {
    AddBlock,
    RemoveBlock,
    BatchAddBlocks,
    BatchRemoveBlocks,
    AddEdge,
    RemoveEdge,
    BatchAddEdges,
    BatchRemoveEdges,
    AddSubflow,
    RemoveSubflow,
    MoveBlock,
    MoveSubflow,
    BatchMoveBlocks,
    DuplicateBlock,
    UpdateParent,
    BatchUpdateParent,
    ApplyDiff,
    AcceptDiff,
    RejectDiff,
    BatchToggleEnabled,
    BatchToggleHandles,
    BatchToggleLocked,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl FromStr for OperationKind {
    type Err = DecodeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        use strum::IntoEnumIterator;

        Self::iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| DecodeError::UnknownVariant(tag.to_owned()))
    }
}

/// Single block insert/delete.
///
/// For `remove-block` the snapshot, incident edges and field values describe what is being
/// deleted; for `add-block` they describe what gets created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    pub block_id: BlockId,
    #[serde(default)]
    pub block_snapshot: Option<BlockSnapshot>,
    #[serde(default)]
    pub edge_snapshots: Vec<EdgeSnapshot>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_block_values: FieldValues,
}

impl BlockData {
    /// Data naming only the target block; snapshots get captured later.
    pub fn target(block_id: BlockId) -> Self {
        Self {
            block_id,
            block_snapshot: None,
            edge_snapshots: Vec::new(),
            sub_block_values: FieldValues::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchBlocksData {
    pub block_snapshots: Vec<BlockSnapshot>,
    #[serde(default)]
    pub edge_snapshots: Vec<EdgeSnapshot>,
    #[serde(default)]
    pub sub_block_values: BTreeMap<BlockId, FieldValues>,
}

impl BatchBlocksData {
    pub fn block_ids(&self) -> impl Iterator<Item = &BlockId> {
        self.block_snapshots.iter().map(|snapshot| &snapshot.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub edge_id: EdgeId,
    #[serde(default)]
    pub edge_snapshot: Option<EdgeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEdgesData {
    pub edge_snapshots: Vec<EdgeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubflowData {
    pub subflow_id: SubflowId,
    #[serde(default)]
    pub subflow_snapshot: Option<SubflowSnapshot>,
    #[serde(default)]
    pub edge_snapshots: Vec<EdgeSnapshot>,
}

impl SubflowData {
    pub fn target(subflow_id: SubflowId) -> Self {
        Self {
            subflow_id,
            subflow_snapshot: None,
            edge_snapshots: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveBlockData {
    pub block_id: BlockId,
    pub before: Placement,
    pub after: Placement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSubflowData {
    pub subflow_id: SubflowId,
    pub before: Placement,
    pub after: Placement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMove {
    pub block_id: BlockId,
    pub before: Placement,
    pub after: Placement,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMoveData {
    pub moves: Vec<BlockMove>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateBlockData {
    pub source_block_id: BlockId,
    pub duplicated_block_id: BlockId,
    pub duplicated_block_snapshot: BlockSnapshot,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_block_values: FieldValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_connect_edge: Option<EdgeSnapshot>,
}

/// What re-parenting does to `affected_edges`.
///
/// Moving a block into a container drops its edges to nodes outside it; the inverse move
/// restores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeAction {
    #[default]
    Remove,
    Restore,
}

impl EdgeAction {
    pub fn flipped(self) -> Self {
        match self {
            Self::Remove => Self::Restore,
            Self::Restore => Self::Remove,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParentData {
    pub block_id: BlockId,
    #[serde(default)]
    pub old_parent_id: Option<SubflowId>,
    #[serde(default)]
    pub new_parent_id: Option<SubflowId>,
    pub old_position: Position,
    pub new_position: Position,
    #[serde(default)]
    pub affected_edges: Vec<EdgeSnapshot>,
    #[serde(default)]
    pub edge_action: EdgeAction,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateParentData {
    pub updates: Vec<UpdateParentData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDiffData {
    pub baseline_snapshot: WorkflowGraph,
    pub proposed_state: WorkflowGraph,
    #[serde(default)]
    pub diff_analysis: Option<DiffAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptDiffData {
    pub before_accept: WorkflowGraph,
    pub after_accept: WorkflowGraph,
    #[serde(default)]
    pub diff_analysis: Option<DiffAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectDiffData {
    pub before_reject: WorkflowGraph,
    pub after_reject: WorkflowGraph,
    #[serde(default)]
    pub diff_analysis: Option<DiffAnalysis>,
}

/// Bulk boolean flag change.
///
/// Applying sets every block or subflow in `block_ids` to its `new_states` value, or flips
/// it when the map has no entry for the node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchToggleData {
    pub block_ids: Vec<BlockId>,
    #[serde(default)]
    pub previous_states: BTreeMap<BlockId, bool>,
    #[serde(default)]
    pub new_states: BTreeMap<BlockId, bool>,
}

impl BatchToggleData {
    pub fn for_blocks(block_ids: Vec<BlockId>) -> Self {
        Self {
            block_ids,
            previous_states: BTreeMap::new(),
            new_states: BTreeMap::new(),
        }
    }
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::AddBlock(_) => OperationKind::AddBlock,
            Self::RemoveBlock(_) => OperationKind::RemoveBlock,
            Self::BatchAddBlocks(_) => OperationKind::BatchAddBlocks,
            Self::BatchRemoveBlocks(_) => OperationKind::BatchRemoveBlocks,
            Self::AddEdge(_) => OperationKind::AddEdge,
            Self::RemoveEdge(_) => OperationKind::RemoveEdge,
            Self::BatchAddEdges(_) => OperationKind::BatchAddEdges,
            Self::BatchRemoveEdges(_) => OperationKind::BatchRemoveEdges,
            Self::AddSubflow(_) => OperationKind::AddSubflow,
            Self::RemoveSubflow(_) => OperationKind::RemoveSubflow,
            Self::MoveBlock(_) => OperationKind::MoveBlock,
            Self::MoveSubflow(_) => OperationKind::MoveSubflow,
            Self::BatchMoveBlocks(_) => OperationKind::BatchMoveBlocks,
            Self::DuplicateBlock(_) => OperationKind::DuplicateBlock,
            Self::UpdateParent(_) => OperationKind::UpdateParent,
            Self::BatchUpdateParent(_) => OperationKind::BatchUpdateParent,
            Self::ApplyDiff(_) => OperationKind::ApplyDiff,
            Self::AcceptDiff(_) => OperationKind::AcceptDiff,
            Self::RejectDiff(_) => OperationKind::RejectDiff,
            Self::BatchToggleEnabled(_) => OperationKind::BatchToggleEnabled,
            Self::BatchToggleHandles(_) => OperationKind::BatchToggleHandles,
            Self::BatchToggleLocked(_) => OperationKind::BatchToggleLocked,
        }
    }

    pub fn inverse(&self) -> Operation {
        invert(self)
    }

    /// Decodes one operation from its wire JSON.
    ///
    /// An unknown `type` tag is reported as [`DecodeError::UnknownVariant`] rather than a
    /// generic parse failure: it means a peer speaks a newer vocabulary.
    pub fn from_json(raw: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(raw).map_err(DecodeError::Malformed)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingTag)?;
        let kind = OperationKind::from_str(tag)?;
        serde_json::from_value(value).map_err(|source| DecodeError::InvalidData { kind, source })
    }

    pub fn to_value(&self) -> Value {
        // Every field is a string-keyed map, a string or a finite number.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

/// Decodes a list of operations: either one JSON array or one operation per line.
///
/// Blank lines are skipped in the line-delimited form.
pub fn decode_operations(raw: &str) -> Result<Vec<Operation>, DecodeError> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(trimmed).map_err(DecodeError::Malformed)?;
        return values.into_iter().map(Operation::from_value).collect();
    }
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Operation::from_json)
        .collect()
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed operation json: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("operation has no string `type` tag")]
    MissingTag,
    #[error("unhandled operation variant `{0}`")]
    UnknownVariant(String),
    #[error("invalid data for `{}` operation: {source}", .kind.as_str())]
    InvalidData {
        kind: OperationKind,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Block,
    Edge,
    Subflow,
}

/// Kind-qualified id of a graph entity touched by an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn block(id: &BlockId) -> Self {
        Self {
            kind: EntityKind::Block,
            id: id.as_str().to_owned(),
        }
    }

    pub fn edge(id: &EdgeId) -> Self {
        Self {
            kind: EntityKind::Edge,
            id: id.as_str().to_owned(),
        }
    }

    pub fn subflow(id: &SubflowId) -> Self {
        Self {
            kind: EntityKind::Subflow,
            id: id.as_str().to_owned(),
        }
    }
}

/// Minimal delta describing which entities changed as the result of applying an operation.
///
/// This is intentionally coarse: it reports only added/removed/updated `EntityRef`s.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Delta {
    pub added: Vec<EntityRef>,
    pub removed: Vec<EntityRef>,
    pub updated: Vec<EntityRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<EntityRef>,
    removed: BTreeSet<EntityRef>,
    updated: BTreeSet<EntityRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, entity: EntityRef) {
        // Removed then re-added within one operation (e.g. a rewired edge) is an update.
        if self.removed.remove(&entity) {
            self.updated.insert(entity);
            return;
        }
        self.updated.remove(&entity);
        self.added.insert(entity);
    }

    fn record_removed(&mut self, entity: EntityRef) {
        if self.added.remove(&entity) {
            return;
        }
        self.updated.remove(&entity);
        self.removed.insert(entity);
    }

    fn record_updated(&mut self, entity: EntityRef) {
        if self.added.contains(&entity) || self.removed.contains(&entity) {
            return;
        }
        self.updated.insert(entity);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("{kind:?} already exists (id={id})")]
    AlreadyExists { kind: EntityKind, id: String },
    #[error("{kind:?} not found (id={id})")]
    NotFound { kind: EntityKind, id: String },
    #[error("{kind:?} {id} cannot be created without a snapshot")]
    MissingSnapshot { kind: EntityKind, id: String },
    #[error("edge {edge_id} references missing node {node_id}")]
    MissingEndpoint { edge_id: EdgeId, node_id: BlockId },
    #[error("{node_id} cannot be placed in unknown subflow {parent_id}")]
    UnknownParent { node_id: BlockId, parent_id: SubflowId },
    #[error("{node_id} cannot be placed in {parent_id}, which it already contains")]
    ParentCycle { node_id: BlockId, parent_id: SubflowId },
    #[error("edge {edge_id} touches none of the nodes being added")]
    DetachedEdge { edge_id: EdgeId },
    #[error("subflow {node_id} has no {flag} flag")]
    NotToggleable { node_id: SubflowId, flag: &'static str },
    #[error("subflow {subflow_id} still contains {children} node(s)")]
    SubflowNotEmpty { subflow_id: SubflowId, children: usize },
}

/// Applies one operation to `graph`.
///
/// All-or-nothing: the operation runs against a copy that replaces `graph` only on success,
/// so a failing batch leaves the graph untouched.
pub fn apply_operation(
    graph: &mut WorkflowGraph,
    operation: &Operation,
) -> Result<Delta, ApplyError> {
    let mut next = graph.clone();
    let mut delta = DeltaBuilder::default();

    match operation {
        Operation::AddBlock(data) => add_block(&mut next, data, &mut delta)?,
        Operation::RemoveBlock(data) => remove_block(&mut next, &data.block_id, &mut delta)?,
        Operation::BatchAddBlocks(data) => batch_add_blocks(&mut next, data, &mut delta)?,
        Operation::BatchRemoveBlocks(data) => {
            for block_id in data.block_ids() {
                remove_block(&mut next, block_id, &mut delta)?;
            }
        }
        Operation::AddEdge(data) => {
            let Some(snapshot) = &data.edge_snapshot else {
                return Err(ApplyError::MissingSnapshot {
                    kind: EntityKind::Edge,
                    id: data.edge_id.as_str().to_owned(),
                });
            };
            add_edge(&mut next, snapshot, &mut delta)?;
        }
        Operation::RemoveEdge(data) => remove_edge(&mut next, &data.edge_id, &mut delta)?,
        Operation::BatchAddEdges(data) => {
            for snapshot in &data.edge_snapshots {
                add_edge(&mut next, snapshot, &mut delta)?;
            }
        }
        Operation::BatchRemoveEdges(data) => {
            for snapshot in &data.edge_snapshots {
                remove_edge(&mut next, &snapshot.id, &mut delta)?;
            }
        }
        Operation::AddSubflow(data) => add_subflow(&mut next, data, &mut delta)?,
        Operation::RemoveSubflow(data) => remove_subflow(&mut next, &data.subflow_id, &mut delta)?,
        Operation::MoveBlock(data) => {
            move_block(&mut next, &data.block_id, &data.after, &mut delta)?;
        }
        Operation::MoveSubflow(data) => {
            move_subflow(&mut next, &data.subflow_id, &data.after, &mut delta)?;
        }
        Operation::BatchMoveBlocks(data) => {
            for block_move in &data.moves {
                move_node(&mut next, &block_move.block_id, &block_move.after, &mut delta)?;
            }
        }
        Operation::DuplicateBlock(data) => duplicate_block(&mut next, data, &mut delta)?,
        Operation::UpdateParent(data) => update_parent(&mut next, data, &mut delta)?,
        Operation::BatchUpdateParent(data) => {
            for update in &data.updates {
                update_parent(&mut next, update, &mut delta)?;
            }
        }
        Operation::ApplyDiff(data) => replace_state(&mut next, &data.proposed_state, &mut delta),
        Operation::AcceptDiff(data) => replace_state(&mut next, &data.after_accept, &mut delta),
        Operation::RejectDiff(data) => replace_state(&mut next, &data.after_reject, &mut delta),
        Operation::BatchToggleEnabled(data) => {
            toggle_flags(&mut next, data, ToggleFlag::Enabled, &mut delta)?;
        }
        Operation::BatchToggleHandles(data) => {
            toggle_flags(&mut next, data, ToggleFlag::HorizontalHandles, &mut delta)?;
        }
        Operation::BatchToggleLocked(data) => {
            toggle_flags(&mut next, data, ToggleFlag::Locked, &mut delta)?;
        }
    }

    *graph = next;
    Ok(delta.finish())
}

// Per-variant graph mutation helpers used by `apply_operation`.
include!("ops_impl.rs");
