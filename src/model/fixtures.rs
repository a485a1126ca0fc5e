// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde_json::json;

use super::{
    BlockId, BlockSnapshot, DiffAnalysis, EdgeId, EdgeSnapshot, FieldValues, Placement, Position,
    SubflowKind, SubflowSnapshot, WorkflowGraph,
};
use crate::ops::{
    AcceptDiffData, ApplyDiffData, BatchBlocksData, BatchEdgesData, BatchMoveData,
    BatchToggleData, BatchUpdateParentData, BlockData, BlockMove, DuplicateBlockData, EdgeAction,
    EdgeData, MoveBlockData, MoveSubflowData, Operation, OperationKind, RejectDiffData,
    SubflowData, UpdateParentData,
};

pub(crate) fn block_id(id: &str) -> BlockId {
    BlockId::new(id).expect("fixture block id")
}

pub(crate) fn edge_id(id: &str) -> EdgeId {
    EdgeId::new(id).expect("fixture edge id")
}

pub(crate) fn block(id: &str, x: f64, y: f64) -> BlockSnapshot {
    BlockSnapshot::new(block_id(id), "agent", id.to_uppercase(), Position::new(x, y))
}

pub(crate) fn edge(id: &str, source: &str, target: &str) -> EdgeSnapshot {
    EdgeSnapshot::new(edge_id(id), block_id(source), block_id(target))
}

/// `start -> agent -> api -> loop1{inner}` plus an empty `loop2`.
pub(crate) fn sample_graph() -> WorkflowGraph {
    let mut graph = WorkflowGraph::default();

    let mut start = block("start", 0.0, 0.0);
    start.block_type = "starter".to_owned();
    let agent = block("agent", 150.0, 0.0);
    let mut api = block("api", 300.0, 0.0);
    api.block_type = "api".to_owned();
    let mut inner = block("inner", 40.0, 40.0);
    inner.parent_id = Some(block_id("loop1"));

    for snapshot in [start, agent, api, inner] {
        graph.blocks_mut().insert(snapshot.id.clone(), snapshot);
    }

    let mut loop1 = SubflowSnapshot::new(block_id("loop1"), SubflowKind::Loop, Position::new(500.0, 0.0));
    loop1.config.insert("iterations".to_owned(), json!(5));
    let loop2 = SubflowSnapshot::new(block_id("loop2"), SubflowKind::Loop, Position::new(900.0, 0.0));
    for subflow in [loop1, loop2] {
        graph.subflows_mut().insert(subflow.id.clone(), subflow);
    }

    for snapshot in [
        edge("start-agent", "start", "agent"),
        edge("agent-api", "agent", "api"),
        edge("api-loop1", "api", "loop1"),
        edge("loop1-loop2", "loop1", "loop2"),
    ] {
        graph.edges_mut().insert(snapshot.id.clone(), snapshot);
    }

    graph.sub_block_values_mut().insert(
        block_id("agent"),
        FieldValues::from([
            ("prompt".to_owned(), json!("Summarize the ticket")),
            ("model".to_owned(), json!("gpt-4o")),
        ]),
    );
    graph.sub_block_values_mut().insert(
        block_id("api"),
        FieldValues::from([("url".to_owned(), json!("https://example.invalid/hook"))]),
    );

    graph
}

fn proposed_graph(baseline: &WorkflowGraph) -> WorkflowGraph {
    let mut proposed = baseline.clone();
    let extra = block("extra", 150.0, 200.0);
    proposed.blocks_mut().insert(extra.id.clone(), extra);
    let snapshot = edge("agent-extra", "agent", "extra");
    proposed.edges_mut().insert(snapshot.id.clone(), snapshot);
    proposed
        .sub_block_values_mut()
        .entry(block_id("agent"))
        .or_default()
        .insert("model".to_owned(), json!("gpt-4o-mini"));
    proposed
}

/// One operation of `kind` that applies cleanly to [`sample_graph`].
///
/// Operations that remove things leave their snapshot fields empty so tests can exercise
/// snapshot capture.
pub(crate) fn sample_operation(kind: OperationKind, graph: &WorkflowGraph) -> Operation {
    match kind {
        OperationKind::AddBlock => Operation::AddBlock(BlockData {
            block_id: block_id("fresh"),
            block_snapshot: Some(block("fresh", 0.0, 200.0)),
            edge_snapshots: vec![edge("fresh-agent", "fresh", "agent")],
            sub_block_values: FieldValues::from([("note".to_owned(), json!("hi"))]),
        }),
        OperationKind::RemoveBlock => Operation::RemoveBlock(BlockData::target(block_id("agent"))),
        OperationKind::BatchAddBlocks => Operation::BatchAddBlocks(BatchBlocksData {
            block_snapshots: vec![block("n1", 0.0, 300.0), block("n2", 150.0, 300.0)],
            edge_snapshots: vec![edge("n1-n2", "n1", "n2"), edge("n2-start", "n2", "start")],
            sub_block_values: BTreeMap::from([(
                block_id("n1"),
                FieldValues::from([("prompt".to_owned(), json!("hello"))]),
            )]),
        }),
        OperationKind::BatchRemoveBlocks => Operation::BatchRemoveBlocks(BatchBlocksData {
            block_snapshots: ["agent", "api"]
                .into_iter()
                .map(|id| graph.blocks()[&block_id(id)].clone())
                .collect(),
            edge_snapshots: Vec::new(),
            sub_block_values: BTreeMap::new(),
        }),
        OperationKind::AddEdge => Operation::AddEdge(EdgeData {
            edge_id: edge_id("start-api"),
            edge_snapshot: Some(edge("start-api", "start", "api")),
        }),
        OperationKind::RemoveEdge => Operation::RemoveEdge(EdgeData {
            edge_id: edge_id("agent-api"),
            edge_snapshot: None,
        }),
        OperationKind::BatchAddEdges => Operation::BatchAddEdges(BatchEdgesData {
            edge_snapshots: vec![edge("e-sa", "start", "api"), edge("e-al", "agent", "loop2")],
        }),
        OperationKind::BatchRemoveEdges => Operation::BatchRemoveEdges(BatchEdgesData {
            edge_snapshots: ["start-agent", "agent-api"]
                .into_iter()
                .map(|id| graph.edges()[&edge_id(id)].clone())
                .collect(),
        }),
        OperationKind::AddSubflow => Operation::AddSubflow(SubflowData {
            subflow_id: block_id("par1"),
            subflow_snapshot: Some(SubflowSnapshot::new(
                block_id("par1"),
                SubflowKind::Parallel,
                Position::new(700.0, 300.0),
            )),
            edge_snapshots: vec![edge("api-par1", "api", "par1")],
        }),
        OperationKind::RemoveSubflow => Operation::RemoveSubflow(SubflowData::target(block_id("loop2"))),
        OperationKind::MoveBlock => Operation::MoveBlock(MoveBlockData {
            block_id: block_id("agent"),
            before: graph.blocks()[&block_id("agent")].placement(),
            after: Placement::new(175.0, 40.0),
        }),
        OperationKind::MoveSubflow => Operation::MoveSubflow(MoveSubflowData {
            subflow_id: block_id("loop1"),
            before: graph.subflows()[&block_id("loop1")].placement(),
            after: Placement::new(520.0, 60.0),
        }),
        OperationKind::BatchMoveBlocks => Operation::BatchMoveBlocks(BatchMoveData {
            moves: vec![
                BlockMove {
                    block_id: block_id("start"),
                    before: graph.blocks()[&block_id("start")].placement(),
                    after: Placement::new(-50.0, 10.0),
                },
                BlockMove {
                    block_id: block_id("api"),
                    before: graph.blocks()[&block_id("api")].placement(),
                    after: Placement::new(20.0, 20.0).with_parent(block_id("loop2")),
                },
            ],
        }),
        OperationKind::DuplicateBlock => {
            let mut duplicate = graph.blocks()[&block_id("agent")].clone();
            duplicate.id = block_id("agent-copy");
            duplicate.name = "AGENT 1".to_owned();
            duplicate.position = Position::new(170.0, 20.0);
            Operation::DuplicateBlock(DuplicateBlockData {
                source_block_id: block_id("agent"),
                duplicated_block_id: block_id("agent-copy"),
                duplicated_block_snapshot: duplicate,
                sub_block_values: graph.sub_block_values()[&block_id("agent")].clone(),
                auto_connect_edge: Some(edge("start-agent-copy", "start", "agent-copy")),
            })
        }
        OperationKind::UpdateParent => Operation::UpdateParent(UpdateParentData {
            block_id: block_id("api"),
            old_parent_id: None,
            new_parent_id: Some(block_id("loop1")),
            old_position: graph.blocks()[&block_id("api")].position,
            new_position: Position::new(20.0, 20.0),
            affected_edges: vec![graph.edges()[&edge_id("agent-api")].clone()],
            edge_action: EdgeAction::Remove,
        }),
        OperationKind::BatchUpdateParent => Operation::BatchUpdateParent(BatchUpdateParentData {
            updates: vec![
                UpdateParentData {
                    block_id: block_id("inner"),
                    old_parent_id: Some(block_id("loop1")),
                    new_parent_id: None,
                    old_position: Position::new(40.0, 40.0),
                    new_position: Position::new(540.0, 40.0),
                    affected_edges: Vec::new(),
                    edge_action: EdgeAction::Remove,
                },
                UpdateParentData {
                    block_id: block_id("start"),
                    old_parent_id: None,
                    new_parent_id: Some(block_id("loop2")),
                    old_position: Position::new(0.0, 0.0),
                    new_position: Position::new(10.0, 10.0),
                    affected_edges: vec![graph.edges()[&edge_id("start-agent")].clone()],
                    edge_action: EdgeAction::Remove,
                },
            ],
        }),
        OperationKind::ApplyDiff => {
            let proposed = proposed_graph(graph);
            Operation::ApplyDiff(ApplyDiffData {
                diff_analysis: Some(DiffAnalysis::between(graph, &proposed)),
                baseline_snapshot: graph.clone(),
                proposed_state: proposed,
            })
        }
        OperationKind::AcceptDiff => {
            let accepted = proposed_graph(graph);
            Operation::AcceptDiff(AcceptDiffData {
                diff_analysis: Some(DiffAnalysis::between(graph, &accepted)),
                before_accept: graph.clone(),
                after_accept: accepted,
            })
        }
        OperationKind::RejectDiff => {
            let mut restored = graph.clone();
            restored.blocks_mut().remove(&block_id("inner"));
            Operation::RejectDiff(RejectDiffData {
                diff_analysis: None,
                before_reject: graph.clone(),
                after_reject: restored,
            })
        }
        OperationKind::BatchToggleEnabled => {
            Operation::BatchToggleEnabled(BatchToggleData::for_blocks(toggle_targets()))
        }
        OperationKind::BatchToggleHandles => {
            Operation::BatchToggleHandles(BatchToggleData::for_blocks(toggle_targets()))
        }
        OperationKind::BatchToggleLocked => {
            Operation::BatchToggleLocked(BatchToggleData::for_blocks(toggle_targets()))
        }
    }
}

fn toggle_targets() -> Vec<BlockId> {
    vec![block_id("start"), block_id("agent")]
}
