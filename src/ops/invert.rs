// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{
    AcceptDiffData, ApplyDiffData, BatchMoveData, BatchToggleData, BatchUpdateParentData,
    BlockData, BlockMove, MoveBlockData, MoveSubflowData, Operation, RejectDiffData,
    UpdateParentData,
};

/// Derives the operation that undoes `operation`.
///
/// - add/remove pairs (and their batch forms) swap the tag and keep the snapshots;
/// - positional operations keep the tag and swap before/after (old/new);
/// - `duplicate-block` becomes `remove-block` of the duplicate;
/// - diff operations swap their two states and keep the analysis;
/// - toggles swap the previous-state and new-state maps.
///
/// Batch inverses list their items in reverse so sequential application unwinds in order.
/// Snapshots missing on the input stay missing on the output; callers that need a
/// replayable inverse capture them first (see [`Operation::capture_snapshots`]).
pub fn invert(operation: &Operation) -> Operation {
    match operation {
        Operation::AddBlock(data) => Operation::RemoveBlock(data.clone()),
        Operation::RemoveBlock(data) => Operation::AddBlock(data.clone()),
        Operation::BatchAddBlocks(data) => Operation::BatchRemoveBlocks(data.clone()),
        Operation::BatchRemoveBlocks(data) => Operation::BatchAddBlocks(data.clone()),
        Operation::AddEdge(data) => Operation::RemoveEdge(data.clone()),
        Operation::RemoveEdge(data) => Operation::AddEdge(data.clone()),
        Operation::BatchAddEdges(data) => Operation::BatchRemoveEdges(data.clone()),
        Operation::BatchRemoveEdges(data) => Operation::BatchAddEdges(data.clone()),
        Operation::AddSubflow(data) => Operation::RemoveSubflow(data.clone()),
        Operation::RemoveSubflow(data) => Operation::AddSubflow(data.clone()),
        Operation::MoveBlock(data) => Operation::MoveBlock(MoveBlockData {
            block_id: data.block_id.clone(),
            before: data.after.clone(),
            after: data.before.clone(),
        }),
        Operation::MoveSubflow(data) => Operation::MoveSubflow(MoveSubflowData {
            subflow_id: data.subflow_id.clone(),
            before: data.after.clone(),
            after: data.before.clone(),
        }),
        Operation::BatchMoveBlocks(data) => Operation::BatchMoveBlocks(BatchMoveData {
            moves: data
                .moves
                .iter()
                .rev()
                .map(|block_move| BlockMove {
                    block_id: block_move.block_id.clone(),
                    before: block_move.after.clone(),
                    after: block_move.before.clone(),
                })
                .collect(),
        }),
        Operation::DuplicateBlock(data) => Operation::RemoveBlock(BlockData {
            block_id: data.duplicated_block_id.clone(),
            block_snapshot: Some(data.duplicated_block_snapshot.clone()),
            edge_snapshots: data.auto_connect_edge.iter().cloned().collect(),
            sub_block_values: data.sub_block_values.clone(),
        }),
        Operation::UpdateParent(data) => Operation::UpdateParent(invert_update_parent(data)),
        Operation::BatchUpdateParent(data) => {
            Operation::BatchUpdateParent(BatchUpdateParentData {
                updates: data.updates.iter().rev().map(invert_update_parent).collect(),
            })
        }
        Operation::ApplyDiff(data) => Operation::ApplyDiff(ApplyDiffData {
            baseline_snapshot: data.proposed_state.clone(),
            proposed_state: data.baseline_snapshot.clone(),
            diff_analysis: data.diff_analysis.clone(),
        }),
        Operation::AcceptDiff(data) => Operation::AcceptDiff(AcceptDiffData {
            before_accept: data.after_accept.clone(),
            after_accept: data.before_accept.clone(),
            diff_analysis: data.diff_analysis.clone(),
        }),
        Operation::RejectDiff(data) => Operation::RejectDiff(RejectDiffData {
            before_reject: data.after_reject.clone(),
            after_reject: data.before_reject.clone(),
            diff_analysis: data.diff_analysis.clone(),
        }),
        Operation::BatchToggleEnabled(data) => Operation::BatchToggleEnabled(swap_states(data)),
        Operation::BatchToggleHandles(data) => Operation::BatchToggleHandles(swap_states(data)),
        Operation::BatchToggleLocked(data) => Operation::BatchToggleLocked(swap_states(data)),
    }
}

fn invert_update_parent(data: &UpdateParentData) -> UpdateParentData {
    UpdateParentData {
        block_id: data.block_id.clone(),
        old_parent_id: data.new_parent_id.clone(),
        new_parent_id: data.old_parent_id.clone(),
        old_position: data.new_position,
        new_position: data.old_position,
        affected_edges: data.affected_edges.clone(),
        edge_action: data.edge_action.flipped(),
    }
}

fn swap_states(data: &BatchToggleData) -> BatchToggleData {
    BatchToggleData {
        block_ids: data.block_ids.clone(),
        previous_states: data.new_states.clone(),
        new_states: data.previous_states.clone(),
    }
}
