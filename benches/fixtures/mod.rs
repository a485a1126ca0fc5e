// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::collections::BTreeMap;

use serde_json::json;

use flowlog::model::{
    BlockId, BlockSnapshot, EdgeId, EdgeSnapshot, FieldValues, Placement, Position, WorkflowGraph,
};
use flowlog::ops::{
    BatchBlocksData, BatchMoveData, BatchToggleData, BlockData, BlockMove, Operation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn blocks(self) -> usize {
        match self {
            Self::Small => 16,
            Self::Medium => 256,
            Self::Large => 2048,
        }
    }
}

pub fn block_id(idx: usize) -> BlockId {
    BlockId::new(format!("blk_{idx:05}")).expect("block id")
}

fn edge_id(from: usize, to: usize) -> EdgeId {
    EdgeId::new(format!("edge_{from:05}_{to:05}")).expect("edge id")
}

fn block(idx: usize) -> BlockSnapshot {
    let x = (idx % 32) as f64 * 180.0;
    let y = (idx / 32) as f64 * 120.0;
    let block_type = if idx % 3 == 0 { "api" } else { "agent" };
    BlockSnapshot::new(
        block_id(idx),
        block_type,
        format!("Block {idx}"),
        Position::new(x, y),
    )
}

fn values(idx: usize) -> FieldValues {
    FieldValues::from([
        ("prompt".to_owned(), json!(format!("step {idx}"))),
        ("temperature".to_owned(), json!((idx % 10) as f64 / 10.0)),
    ])
}

/// A chain `blk_0 -> blk_1 -> ...` with skip edges every fourth block.
pub fn graph(case: Case) -> WorkflowGraph {
    let count = case.blocks();
    let mut graph = WorkflowGraph::default();
    for idx in 0..count {
        let snapshot = block(idx);
        graph.blocks_mut().insert(snapshot.id.clone(), snapshot);
        graph.sub_block_values_mut().insert(block_id(idx), values(idx));
    }
    for idx in 1..count {
        let edge = EdgeSnapshot::new(edge_id(idx - 1, idx), block_id(idx - 1), block_id(idx));
        graph.edges_mut().insert(edge.id.clone(), edge);
        if idx % 4 == 0 && idx >= 4 {
            let skip = EdgeSnapshot::new(edge_id(idx - 4, idx), block_id(idx - 4), block_id(idx));
            graph.edges_mut().insert(skip.id.clone(), skip);
        }
    }
    graph
}

/// Removes every other block in the first half of the graph; snapshots are left for capture.
pub fn batch_remove(graph: &WorkflowGraph) -> Operation {
    let half = graph.blocks().len() / 2;
    Operation::BatchRemoveBlocks(BatchBlocksData {
        block_snapshots: graph.blocks().values().take(half).step_by(2).cloned().collect(),
        edge_snapshots: Vec::new(),
        sub_block_values: BTreeMap::new(),
    })
}

/// Pastes `count` new blocks wired into a chain hanging off `blk_0`.
pub fn batch_paste(count: usize) -> Operation {
    let base = 1_000_000;
    let block_snapshots = (0..count).map(|idx| block(base + idx)).collect::<Vec<_>>();
    let mut edge_snapshots = vec![EdgeSnapshot::new(
        edge_id(0, base),
        block_id(0),
        block_id(base),
    )];
    edge_snapshots.extend((1..count).map(|idx| {
        EdgeSnapshot::new(
            edge_id(base + idx - 1, base + idx),
            block_id(base + idx - 1),
            block_id(base + idx),
        )
    }));
    let sub_block_values = (0..count)
        .map(|idx| (block_id(base + idx), values(base + idx)))
        .collect();
    Operation::BatchAddBlocks(BatchBlocksData {
        block_snapshots,
        edge_snapshots,
        sub_block_values,
    })
}

pub fn batch_move(graph: &WorkflowGraph) -> Operation {
    Operation::BatchMoveBlocks(BatchMoveData {
        moves: graph
            .blocks()
            .values()
            .map(|snapshot| {
                let before = snapshot.placement();
                let after = Placement::new(before.x + 25.0, before.y - 10.0);
                BlockMove {
                    block_id: snapshot.id.clone(),
                    before,
                    after,
                }
            })
            .collect(),
    })
}

pub fn toggle_all(graph: &WorkflowGraph) -> Operation {
    Operation::BatchToggleEnabled(BatchToggleData::for_blocks(
        graph.blocks().keys().cloned().collect(),
    ))
}

pub fn remove_middle(graph: &WorkflowGraph) -> Operation {
    let middle = graph.blocks().len() / 2;
    Operation::RemoveBlock(BlockData::target(block_id(middle)))
}
