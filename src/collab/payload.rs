// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::{EnumIter, IntoStaticStr};

use crate::model::{BlockId, Placement};
use crate::ops::{BatchToggleData, Operation, UpdateParentData};

/// Verb half of a collaboration message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CollabVerb {
    Add,
    Remove,
    BatchAdd,
    BatchRemove,
    UpdatePosition,
    BatchUpdatePositions,
    UpdateParent,
    BatchUpdateParent,
    Duplicate,
    ApplyDiff,
    AcceptDiff,
    RejectDiff,
    BatchToggleEnabled,
    BatchToggleHandles,
    BatchToggleLocked,
}

impl CollabVerb {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Entity kind a collaboration message acts on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CollabTarget {
    Block,
    Edge,
    Subflow,
    Workflow,
}

impl CollabTarget {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// `{operation, target, payload}` message broadcast to peers.
///
/// Built at broadcast time and dropped after sending; never stored in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborativePayload {
    pub operation: CollabVerb,
    pub target: CollabTarget,
    pub payload: Value,
}

impl CollaborativePayload {
    fn new(operation: CollabVerb, target: CollabTarget, payload: Value) -> Self {
        Self {
            operation,
            target,
            payload,
        }
    }
}

/// Translates a forward operation into the minimal message a peer needs to replay it.
///
/// Peers only ever apply forward operations, so positional payloads carry the target
/// placement and never the `before` state. Batch removals carry ids only; batch additions
/// carry full snapshots so a peer that has never seen the entities can materialize them.
pub fn to_collaborative_payload(operation: &Operation) -> CollaborativePayload {
    use CollabTarget as T;
    use CollabVerb as V;

    match operation {
        Operation::AddBlock(data) => CollaborativePayload::new(
            V::Add,
            T::Block,
            json!({
                "id": data.block_id,
                "block": data.block_snapshot,
                "edges": data.edge_snapshots,
                "subBlockValues": data.sub_block_values,
            }),
        ),
        Operation::RemoveBlock(data) => {
            CollaborativePayload::new(V::Remove, T::Block, json!({ "id": data.block_id }))
        }
        Operation::BatchAddBlocks(data) => CollaborativePayload::new(
            V::BatchAdd,
            T::Block,
            json!({
                "blocks": data.block_snapshots,
                "edges": data.edge_snapshots,
                "subBlockValues": data.sub_block_values,
            }),
        ),
        Operation::BatchRemoveBlocks(data) => CollaborativePayload::new(
            V::BatchRemove,
            T::Block,
            json!({ "ids": data.block_ids().collect::<Vec<_>>() }),
        ),
        Operation::AddEdge(data) => CollaborativePayload::new(
            V::Add,
            T::Edge,
            json!({ "id": data.edge_id, "edge": data.edge_snapshot }),
        ),
        Operation::RemoveEdge(data) => {
            CollaborativePayload::new(V::Remove, T::Edge, json!({ "id": data.edge_id }))
        }
        Operation::BatchAddEdges(data) => CollaborativePayload::new(
            V::BatchAdd,
            T::Edge,
            json!({ "edges": data.edge_snapshots }),
        ),
        Operation::BatchRemoveEdges(data) => CollaborativePayload::new(
            V::BatchRemove,
            T::Edge,
            json!({
                "ids": data.edge_snapshots.iter().map(|edge| &edge.id).collect::<Vec<_>>(),
            }),
        ),
        Operation::AddSubflow(data) => CollaborativePayload::new(
            V::Add,
            T::Subflow,
            json!({
                "id": data.subflow_id,
                "subflow": data.subflow_snapshot,
                "edges": data.edge_snapshots,
            }),
        ),
        Operation::RemoveSubflow(data) => {
            CollaborativePayload::new(V::Remove, T::Subflow, json!({ "id": data.subflow_id }))
        }
        Operation::MoveBlock(data) => CollaborativePayload::new(
            V::UpdatePosition,
            T::Block,
            position_update(&data.block_id, &data.after),
        ),
        Operation::MoveSubflow(data) => CollaborativePayload::new(
            V::UpdatePosition,
            T::Subflow,
            position_update(&data.subflow_id, &data.after),
        ),
        Operation::BatchMoveBlocks(data) => CollaborativePayload::new(
            V::BatchUpdatePositions,
            T::Block,
            json!({
                "updates": data
                    .moves
                    .iter()
                    .map(|block_move| position_update(&block_move.block_id, &block_move.after))
                    .collect::<Vec<_>>(),
            }),
        ),
        Operation::DuplicateBlock(data) => CollaborativePayload::new(
            V::Duplicate,
            T::Block,
            json!({
                "sourceId": data.source_block_id,
                "id": data.duplicated_block_id,
                "block": data.duplicated_block_snapshot,
                "subBlockValues": data.sub_block_values,
                "edge": data.auto_connect_edge,
            }),
        ),
        Operation::UpdateParent(data) => {
            CollaborativePayload::new(V::UpdateParent, T::Block, parent_update(data))
        }
        Operation::BatchUpdateParent(data) => CollaborativePayload::new(
            V::BatchUpdateParent,
            T::Block,
            json!({ "updates": data.updates.iter().map(parent_update).collect::<Vec<_>>() }),
        ),
        Operation::ApplyDiff(data) => CollaborativePayload::new(
            V::ApplyDiff,
            T::Workflow,
            json!({ "state": data.proposed_state, "diffAnalysis": data.diff_analysis }),
        ),
        Operation::AcceptDiff(data) => CollaborativePayload::new(
            V::AcceptDiff,
            T::Workflow,
            json!({ "state": data.after_accept, "diffAnalysis": data.diff_analysis }),
        ),
        Operation::RejectDiff(data) => CollaborativePayload::new(
            V::RejectDiff,
            T::Workflow,
            json!({ "state": data.after_reject }),
        ),
        Operation::BatchToggleEnabled(data) => {
            CollaborativePayload::new(V::BatchToggleEnabled, T::Block, toggle_update(data))
        }
        Operation::BatchToggleHandles(data) => {
            CollaborativePayload::new(V::BatchToggleHandles, T::Block, toggle_update(data))
        }
        Operation::BatchToggleLocked(data) => {
            CollaborativePayload::new(V::BatchToggleLocked, T::Block, toggle_update(data))
        }
    }
}

fn position_update(id: &BlockId, after: &Placement) -> Value {
    json!({
        "id": id,
        "position": after.position(),
        "parentId": after.parent_id,
    })
}

fn parent_update(data: &UpdateParentData) -> Value {
    json!({
        "id": data.block_id,
        "parentId": data.new_parent_id,
        "position": data.new_position,
        "affectedEdges": data.affected_edges,
        "edgeAction": data.edge_action,
    })
}

// Peers without the block's prior state still need explicit values.
fn toggle_update(data: &BatchToggleData) -> Value {
    json!({
        "blockIds": data.block_ids,
        "states": data.new_states,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::{to_collaborative_payload, CollabTarget, CollabVerb};
    use crate::model::fixtures::{block_id, sample_graph, sample_operation};
    use crate::model::Placement;
    use crate::ops::{MoveBlockData, Operation, OperationKind};

    #[test]
    fn move_block_payload_never_carries_the_before_state() {
        let operation = Operation::MoveBlock(MoveBlockData {
            block_id: block_id("b1"),
            before: Placement::new(0.0, 0.0),
            after: Placement::new(10.0, 20.0).with_parent(block_id("loop1")),
        });

        let message = to_collaborative_payload(&operation);
        assert_eq!(message.operation, CollabVerb::UpdatePosition);
        assert_eq!(message.target, CollabTarget::Block);
        assert_eq!(
            message.payload,
            json!({"id": "b1", "position": {"x": 10.0, "y": 20.0}, "parentId": "loop1"})
        );
    }

    #[test]
    fn batch_remove_blocks_sends_ids_only() {
        let graph = sample_graph();
        let mut operation = sample_operation(OperationKind::BatchRemoveBlocks, &graph);
        operation.capture_snapshots(&graph);

        let message = to_collaborative_payload(&operation);
        assert_eq!(message.operation, CollabVerb::BatchRemove);
        assert_eq!(message.payload, json!({"ids": ["agent", "api"]}));
    }

    #[test]
    fn batch_add_blocks_sends_full_snapshots_and_values() {
        let graph = sample_graph();
        let operation = sample_operation(OperationKind::BatchAddBlocks, &graph);

        let message = to_collaborative_payload(&operation);
        assert_eq!(message.operation, CollabVerb::BatchAdd);
        assert_eq!(message.target, CollabTarget::Block);

        let blocks = message.payload["blocks"].as_array().expect("blocks array");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["id"], "n1");
        assert_eq!(blocks[0]["type"], "agent");
        assert_eq!(blocks[0]["position"], json!({"x": 0.0, "y": 300.0}));
        assert_eq!(message.payload["edges"].as_array().map(Vec::len), Some(2));
        assert_eq!(message.payload["subBlockValues"]["n1"]["prompt"], "hello");
    }

    #[test]
    fn diff_payloads_target_the_workflow() {
        let graph = sample_graph();
        for kind in [
            OperationKind::ApplyDiff,
            OperationKind::AcceptDiff,
            OperationKind::RejectDiff,
        ] {
            let message = to_collaborative_payload(&sample_operation(kind, &graph));
            assert_eq!(message.target, CollabTarget::Workflow);
            assert_eq!(message.operation.as_str(), kind.as_str());
            assert!(message.payload["state"]["blocks"].is_object());
        }
    }

    #[test]
    fn every_kind_translates_to_an_object_payload() {
        let graph = sample_graph();
        for kind in OperationKind::iter() {
            let message = to_collaborative_payload(&sample_operation(kind, &graph));
            assert!(message.payload.is_object(), "{}", kind.as_str());

            let wire = serde_json::to_value(&message).expect("serialize");
            assert_eq!(wire["operation"], message.operation.as_str());
            assert_eq!(wire["target"], message.target.as_str());
        }
    }

    #[test]
    fn every_verb_is_reachable() {
        let graph = sample_graph();
        let used = OperationKind::iter()
            .map(|kind| to_collaborative_payload(&sample_operation(kind, &graph)).operation)
            .collect::<Vec<_>>();
        for verb in CollabVerb::iter() {
            assert!(used.contains(&verb), "{} unused", verb.as_str());
        }
    }
}
