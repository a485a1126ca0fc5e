// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::{BlockId, EdgeId, SubflowId};

/// Field values of one block, keyed by subBlock (field) id.
pub type FieldValues = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where a node sits: canvas coordinates plus the optional subflow container it lives in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SubflowId>,
}

impl Placement {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: SubflowId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

fn default_true() -> bool {
    true
}

/// Full state of one block as captured at operation-creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSnapshot {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: String,
    pub name: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SubflowId>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub horizontal_handles: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Value>,
}

impl BlockSnapshot {
    pub fn new(
        id: BlockId,
        block_type: impl Into<String>,
        name: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            id,
            block_type: block_type.into(),
            name: name.into(),
            position,
            parent_id: None,
            enabled: true,
            horizontal_handles: false,
            locked: false,
            data: BTreeMap::new(),
        }
    }

    pub fn placement(&self) -> Placement {
        Placement {
            x: self.position.x,
            y: self.position.y,
            parent_id: self.parent_id.clone(),
        }
    }

    pub fn set_placement(&mut self, placement: &Placement) {
        self.position = placement.position();
        self.parent_id = placement.parent_id.clone();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSnapshot {
    pub id: EdgeId,
    pub source: BlockId,
    pub target: BlockId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl EdgeSnapshot {
    pub fn new(id: EdgeId, source: BlockId, target: BlockId) -> Self {
        Self {
            id,
            source,
            target,
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn touches(&self, node_id: &BlockId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubflowKind {
    Loop,
    Parallel,
}

/// A loop or parallel container node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubflowSnapshot {
    pub id: SubflowId,
    pub kind: SubflowKind,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SubflowId>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, Value>,
}

impl SubflowSnapshot {
    pub fn new(id: SubflowId, kind: SubflowKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            parent_id: None,
            enabled: true,
            locked: false,
            config: BTreeMap::new(),
        }
    }

    pub fn placement(&self) -> Placement {
        Placement {
            x: self.position.x,
            y: self.position.y,
            parent_id: self.parent_id.clone(),
        }
    }

    pub fn set_placement(&mut self, placement: &Placement) {
        self.position = placement.position();
        self.parent_id = placement.parent_id.clone();
    }
}

/// The live workflow graph an editor session mutates.
///
/// Also used as the full-state snapshot carried by diff operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowGraph {
    #[serde(default)]
    blocks: BTreeMap<BlockId, BlockSnapshot>,
    #[serde(default)]
    edges: BTreeMap<EdgeId, EdgeSnapshot>,
    #[serde(default)]
    subflows: BTreeMap<SubflowId, SubflowSnapshot>,
    #[serde(default)]
    sub_block_values: BTreeMap<BlockId, FieldValues>,
}

impl WorkflowGraph {
    pub fn blocks(&self) -> &BTreeMap<BlockId, BlockSnapshot> {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BTreeMap<BlockId, BlockSnapshot> {
        &mut self.blocks
    }

    pub fn edges(&self) -> &BTreeMap<EdgeId, EdgeSnapshot> {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut BTreeMap<EdgeId, EdgeSnapshot> {
        &mut self.edges
    }

    pub fn subflows(&self) -> &BTreeMap<SubflowId, SubflowSnapshot> {
        &self.subflows
    }

    pub fn subflows_mut(&mut self) -> &mut BTreeMap<SubflowId, SubflowSnapshot> {
        &mut self.subflows
    }

    pub fn sub_block_values(&self) -> &BTreeMap<BlockId, FieldValues> {
        &self.sub_block_values
    }

    pub fn sub_block_values_mut(&mut self) -> &mut BTreeMap<BlockId, FieldValues> {
        &mut self.sub_block_values
    }

    /// True if `node_id` names a block or a subflow container.
    pub fn contains_node(&self, node_id: &BlockId) -> bool {
        self.blocks.contains_key(node_id) || self.subflows.contains_key(node_id)
    }

    /// Edges with `node_id` as source or target, in edge-id order.
    pub fn incident_edges(&self, node_id: &BlockId) -> Vec<EdgeSnapshot> {
        self.edges
            .values()
            .filter(|edge| edge.touches(node_id))
            .cloned()
            .collect()
    }

    /// Number of blocks and subflows whose parent is `subflow_id`.
    pub fn child_count(&self, subflow_id: &SubflowId) -> usize {
        let blocks = self
            .blocks
            .values()
            .filter(|block| block.parent_id.as_ref() == Some(subflow_id))
            .count();
        let subflows = self
            .subflows
            .values()
            .filter(|subflow| subflow.parent_id.as_ref() == Some(subflow_id))
            .count();
        blocks + subflows
    }

    /// True if the graph holds no nodes, edges or field values.
    ///
    /// Values orphaned from their block still count: they are state a diff replacement or a
    /// re-added block would pick up again.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
            && self.edges.is_empty()
            && self.subflows.is_empty()
            && self.sub_block_values.is_empty()
    }

    /// Walks `parent_id`'s ancestor chain; true if it reaches `node_id`.
    ///
    /// Stops at the first repeated container so an already-cyclic graph cannot hang the walk.
    pub fn is_ancestor_or_self(&self, node_id: &BlockId, parent_id: &SubflowId) -> bool {
        let mut seen = BTreeSet::new();
        let mut current = Some(parent_id);
        while let Some(id) = current {
            if id == node_id {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.subflows.get(id).and_then(|subflow| subflow.parent_id.as_ref());
        }
        false
    }
}
