// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use crate::model::{EdgeSnapshot, WorkflowGraph};

use super::{BatchToggleData, Operation, ToggleFlag};

impl Operation {
    /// Fills snapshot fields left empty by the caller from the live, pre-operation `graph`.
    ///
    /// Removal operations are often built from an id alone; capturing here makes their
    /// inverse self-contained so it can be replayed without consulting the graph again.
    /// Fields the caller already populated are kept as-is, except the edge lists of
    /// removals: applying a removal drops every incident edge, so those lists are rebuilt
    /// from the graph (keeping the caller's order for edges it named).
    pub fn capture_snapshots(&mut self, graph: &WorkflowGraph) {
        match self {
            Operation::RemoveBlock(data) => {
                if data.block_snapshot.is_none() {
                    data.block_snapshot = graph.blocks().get(&data.block_id).cloned();
                }
                sync_edges(&mut data.edge_snapshots, graph.incident_edges(&data.block_id));
                if data.sub_block_values.is_empty() {
                    if let Some(values) = graph.sub_block_values().get(&data.block_id) {
                        data.sub_block_values = values.clone();
                    }
                }
            }
            Operation::BatchRemoveBlocks(data) => {
                let block_ids = data.block_ids().cloned().collect::<Vec<_>>();
                let incident = block_ids
                    .iter()
                    .flat_map(|block_id| graph.incident_edges(block_id))
                    .collect::<Vec<_>>();
                sync_edges(&mut data.edge_snapshots, incident);

                for block_id in block_ids {
                    if data.sub_block_values.contains_key(&block_id) {
                        continue;
                    }
                    if let Some(values) = graph.sub_block_values().get(&block_id) {
                        data.sub_block_values.insert(block_id, values.clone());
                    }
                }
            }
            Operation::RemoveEdge(data) => {
                if data.edge_snapshot.is_none() {
                    data.edge_snapshot = graph.edges().get(&data.edge_id).cloned();
                }
            }
            Operation::RemoveSubflow(data) => {
                if data.subflow_snapshot.is_none() {
                    data.subflow_snapshot = graph.subflows().get(&data.subflow_id).cloned();
                }
                sync_edges(&mut data.edge_snapshots, graph.incident_edges(&data.subflow_id));
            }
            Operation::BatchToggleEnabled(data) => capture_states(data, graph, ToggleFlag::Enabled),
            Operation::BatchToggleHandles(data) => {
                capture_states(data, graph, ToggleFlag::HorizontalHandles);
            }
            Operation::BatchToggleLocked(data) => capture_states(data, graph, ToggleFlag::Locked),
            // These carry everything they need (or describe creation).
            Operation::AddBlock(_)
            | Operation::BatchAddBlocks(_)
            | Operation::AddEdge(_)
            | Operation::BatchAddEdges(_)
            | Operation::BatchRemoveEdges(_)
            | Operation::AddSubflow(_)
            | Operation::MoveBlock(_)
            | Operation::MoveSubflow(_)
            | Operation::BatchMoveBlocks(_)
            | Operation::DuplicateBlock(_)
            | Operation::UpdateParent(_)
            | Operation::BatchUpdateParent(_)
            | Operation::ApplyDiff(_)
            | Operation::AcceptDiff(_)
            | Operation::RejectDiff(_) => {}
        }
    }
}

/// Replaces `edges` with the live `incident` edges, de-duplicated by id.
///
/// Ids the caller listed keep their position; the live snapshot wins over the caller's
/// copy, and listed edges that are not incident are dropped.
fn sync_edges(edges: &mut Vec<EdgeSnapshot>, incident: Vec<EdgeSnapshot>) {
    let mut live = BTreeMap::new();
    let mut order = Vec::new();
    for edge in incident {
        if !live.contains_key(&edge.id) {
            order.push(edge.id.clone());
            live.insert(edge.id.clone(), edge);
        }
    }

    let mut synced = edges
        .iter()
        .filter_map(|edge| live.remove(&edge.id))
        .collect::<Vec<_>>();
    synced.extend(order.iter().filter_map(|edge_id| live.remove(edge_id)));
    *edges = synced;
}

fn capture_states(data: &mut BatchToggleData, graph: &WorkflowGraph, flag: ToggleFlag) {
    for node_id in &data.block_ids {
        let Ok(current) = flag.read(graph, node_id) else {
            continue;
        };
        let previous = *data.previous_states.entry(node_id.clone()).or_insert(current);
        data.new_states.entry(node_id.clone()).or_insert(!previous);
    }
}
