// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Graph mutation helpers used by `apply_operation`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn add_block(
    graph: &mut WorkflowGraph,
    data: &BlockData,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    let Some(snapshot) = &data.block_snapshot else {
        return Err(ApplyError::MissingSnapshot {
            kind: EntityKind::Block,
            id: data.block_id.as_str().to_owned(),
        });
    };
    if graph.contains_node(&data.block_id) {
        return Err(ApplyError::AlreadyExists {
            kind: EntityKind::Block,
            id: data.block_id.as_str().to_owned(),
        });
    }
    check_parent(graph, &data.block_id, snapshot.parent_id.as_ref())?;

    let mut block = snapshot.clone();
    block.id = data.block_id.clone();
    graph.blocks_mut().insert(data.block_id.clone(), block);
    if !data.sub_block_values.is_empty() {
        graph
            .sub_block_values_mut()
            .insert(data.block_id.clone(), data.sub_block_values.clone());
    }
    delta.record_added(EntityRef::block(&data.block_id));

    for edge in &data.edge_snapshots {
        add_attached_edge(graph, edge, &[&data.block_id], delta)?;
    }
    Ok(())
}

fn remove_block(
    graph: &mut WorkflowGraph,
    block_id: &BlockId,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    if graph.blocks_mut().remove(block_id).is_none() {
        return Err(ApplyError::NotFound {
            kind: EntityKind::Block,
            id: block_id.as_str().to_owned(),
        });
    }
    remove_incident_edges(graph, block_id, delta);
    graph.sub_block_values_mut().remove(block_id);
    delta.record_removed(EntityRef::block(block_id));
    Ok(())
}

fn batch_add_blocks(
    graph: &mut WorkflowGraph,
    data: &BatchBlocksData,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    for snapshot in &data.block_snapshots {
        if graph.contains_node(&snapshot.id) {
            return Err(ApplyError::AlreadyExists {
                kind: EntityKind::Block,
                id: snapshot.id.as_str().to_owned(),
            });
        }
        graph.blocks_mut().insert(snapshot.id.clone(), snapshot.clone());
        delta.record_added(EntityRef::block(&snapshot.id));
    }
    // Parents are checked once the whole batch is in place.
    for snapshot in &data.block_snapshots {
        check_parent(graph, &snapshot.id, snapshot.parent_id.as_ref())?;
    }

    for (block_id, values) in &data.sub_block_values {
        if !graph.blocks().contains_key(block_id) {
            return Err(ApplyError::NotFound {
                kind: EntityKind::Block,
                id: block_id.as_str().to_owned(),
            });
        }
        if !values.is_empty() {
            graph
                .sub_block_values_mut()
                .insert(block_id.clone(), values.clone());
        }
    }

    let added = data
        .block_snapshots
        .iter()
        .map(|snapshot| &snapshot.id)
        .collect::<Vec<_>>();
    for edge in &data.edge_snapshots {
        add_attached_edge(graph, edge, &added, delta)?;
    }
    Ok(())
}

/// Adds an edge carried by a node creation.
///
/// The edge must touch one of `added`: the inverse removal only drops the removed nodes'
/// incident edges, so an unrelated edge would survive undo.
fn add_attached_edge(
    graph: &mut WorkflowGraph,
    edge: &EdgeSnapshot,
    added: &[&BlockId],
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    if !added.iter().any(|node_id| edge.touches(node_id)) {
        return Err(ApplyError::DetachedEdge {
            edge_id: edge.id.clone(),
        });
    }
    add_edge(graph, edge, delta)
}

fn add_edge(
    graph: &mut WorkflowGraph,
    edge: &EdgeSnapshot,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    if graph.edges().contains_key(&edge.id) {
        return Err(ApplyError::AlreadyExists {
            kind: EntityKind::Edge,
            id: edge.id.as_str().to_owned(),
        });
    }
    for endpoint in [&edge.source, &edge.target] {
        if !graph.contains_node(endpoint) {
            return Err(ApplyError::MissingEndpoint {
                edge_id: edge.id.clone(),
                node_id: endpoint.clone(),
            });
        }
    }
    graph.edges_mut().insert(edge.id.clone(), edge.clone());
    delta.record_added(EntityRef::edge(&edge.id));
    Ok(())
}

fn remove_edge(
    graph: &mut WorkflowGraph,
    edge_id: &EdgeId,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    if graph.edges_mut().remove(edge_id).is_none() {
        return Err(ApplyError::NotFound {
            kind: EntityKind::Edge,
            id: edge_id.as_str().to_owned(),
        });
    }
    delta.record_removed(EntityRef::edge(edge_id));
    Ok(())
}

fn remove_incident_edges(graph: &mut WorkflowGraph, node_id: &BlockId, delta: &mut DeltaBuilder) {
    let to_remove = graph
        .edges()
        .iter()
        .filter(|(_, edge)| edge.touches(node_id))
        .map(|(edge_id, _)| edge_id.clone())
        .collect::<Vec<_>>();
    for edge_id in to_remove {
        graph.edges_mut().remove(&edge_id);
        delta.record_removed(EntityRef::edge(&edge_id));
    }
}

fn add_subflow(
    graph: &mut WorkflowGraph,
    data: &SubflowData,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    let Some(snapshot) = &data.subflow_snapshot else {
        return Err(ApplyError::MissingSnapshot {
            kind: EntityKind::Subflow,
            id: data.subflow_id.as_str().to_owned(),
        });
    };
    if graph.contains_node(&data.subflow_id) {
        return Err(ApplyError::AlreadyExists {
            kind: EntityKind::Subflow,
            id: data.subflow_id.as_str().to_owned(),
        });
    }
    check_parent(graph, &data.subflow_id, snapshot.parent_id.as_ref())?;

    let mut subflow = snapshot.clone();
    subflow.id = data.subflow_id.clone();
    graph.subflows_mut().insert(data.subflow_id.clone(), subflow);
    delta.record_added(EntityRef::subflow(&data.subflow_id));

    for edge in &data.edge_snapshots {
        add_attached_edge(graph, edge, &[&data.subflow_id], delta)?;
    }
    Ok(())
}

fn remove_subflow(
    graph: &mut WorkflowGraph,
    subflow_id: &SubflowId,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    if !graph.subflows().contains_key(subflow_id) {
        return Err(ApplyError::NotFound {
            kind: EntityKind::Subflow,
            id: subflow_id.as_str().to_owned(),
        });
    }
    let children = graph.child_count(subflow_id);
    if children > 0 {
        return Err(ApplyError::SubflowNotEmpty {
            subflow_id: subflow_id.clone(),
            children,
        });
    }
    graph.subflows_mut().remove(subflow_id);
    remove_incident_edges(graph, subflow_id, delta);
    delta.record_removed(EntityRef::subflow(subflow_id));
    Ok(())
}

fn check_parent(
    graph: &WorkflowGraph,
    node_id: &BlockId,
    parent_id: Option<&SubflowId>,
) -> Result<(), ApplyError> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    if !graph.subflows().contains_key(parent_id) {
        return Err(ApplyError::UnknownParent {
            node_id: node_id.clone(),
            parent_id: parent_id.clone(),
        });
    }
    if graph.is_ancestor_or_self(node_id, parent_id) {
        return Err(ApplyError::ParentCycle {
            node_id: node_id.clone(),
            parent_id: parent_id.clone(),
        });
    }
    Ok(())
}

/// Moves a block, or a subflow when `node_id` names one; batch moves span both.
fn move_node(
    graph: &mut WorkflowGraph,
    node_id: &BlockId,
    placement: &Placement,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    if graph.subflows().contains_key(node_id) {
        move_subflow(graph, node_id, placement, delta)
    } else {
        move_block(graph, node_id, placement, delta)
    }
}

fn move_block(
    graph: &mut WorkflowGraph,
    block_id: &BlockId,
    placement: &Placement,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    check_parent(graph, block_id, placement.parent_id.as_ref())?;
    let Some(block) = graph.blocks_mut().get_mut(block_id) else {
        return Err(ApplyError::NotFound {
            kind: EntityKind::Block,
            id: block_id.as_str().to_owned(),
        });
    };
    block.set_placement(placement);
    delta.record_updated(EntityRef::block(block_id));
    Ok(())
}

fn move_subflow(
    graph: &mut WorkflowGraph,
    subflow_id: &SubflowId,
    placement: &Placement,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    check_parent(graph, subflow_id, placement.parent_id.as_ref())?;
    let Some(subflow) = graph.subflows_mut().get_mut(subflow_id) else {
        return Err(ApplyError::NotFound {
            kind: EntityKind::Subflow,
            id: subflow_id.as_str().to_owned(),
        });
    };
    subflow.set_placement(placement);
    delta.record_updated(EntityRef::subflow(subflow_id));
    Ok(())
}

fn duplicate_block(
    graph: &mut WorkflowGraph,
    data: &DuplicateBlockData,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    let as_add = BlockData {
        block_id: data.duplicated_block_id.clone(),
        block_snapshot: Some(data.duplicated_block_snapshot.clone()),
        edge_snapshots: data.auto_connect_edge.iter().cloned().collect(),
        sub_block_values: data.sub_block_values.clone(),
    };
    add_block(graph, &as_add, delta)
}

fn update_parent(
    graph: &mut WorkflowGraph,
    data: &UpdateParentData,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    let placement = Placement {
        x: data.new_position.x,
        y: data.new_position.y,
        parent_id: data.new_parent_id.clone(),
    };
    move_node(graph, &data.block_id, &placement, delta)?;

    // Idempotent per edge: a batch may list the same boundary edge for several blocks.
    match data.edge_action {
        EdgeAction::Remove => {
            for edge in &data.affected_edges {
                if graph.edges().contains_key(&edge.id) {
                    remove_edge(graph, &edge.id, delta)?;
                }
            }
        }
        EdgeAction::Restore => {
            for edge in &data.affected_edges {
                if !graph.edges().contains_key(&edge.id) {
                    add_edge(graph, edge, delta)?;
                }
            }
        }
    }
    Ok(())
}

fn replace_state(graph: &mut WorkflowGraph, target: &WorkflowGraph, delta: &mut DeltaBuilder) {
    let empty = FieldValues::new();

    for (block_id, block) in target.blocks() {
        match graph.blocks().get(block_id) {
            None => delta.record_added(EntityRef::block(block_id)),
            Some(current) => {
                let values_changed = graph.sub_block_values().get(block_id).unwrap_or(&empty)
                    != target.sub_block_values().get(block_id).unwrap_or(&empty);
                if current != block || values_changed {
                    delta.record_updated(EntityRef::block(block_id));
                }
            }
        }
    }
    for block_id in graph.blocks().keys() {
        if !target.blocks().contains_key(block_id) {
            delta.record_removed(EntityRef::block(block_id));
        }
    }

    for (edge_id, edge) in target.edges() {
        match graph.edges().get(edge_id) {
            None => delta.record_added(EntityRef::edge(edge_id)),
            Some(current) if current != edge => delta.record_updated(EntityRef::edge(edge_id)),
            Some(_) => {}
        }
    }
    for edge_id in graph.edges().keys() {
        if !target.edges().contains_key(edge_id) {
            delta.record_removed(EntityRef::edge(edge_id));
        }
    }

    for (subflow_id, subflow) in target.subflows() {
        match graph.subflows().get(subflow_id) {
            None => delta.record_added(EntityRef::subflow(subflow_id)),
            Some(current) if current != subflow => {
                delta.record_updated(EntityRef::subflow(subflow_id));
            }
            Some(_) => {}
        }
    }
    for subflow_id in graph.subflows().keys() {
        if !target.subflows().contains_key(subflow_id) {
            delta.record_removed(EntityRef::subflow(subflow_id));
        }
    }

    *graph = target.clone();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToggleFlag {
    Enabled,
    HorizontalHandles,
    Locked,
}

impl ToggleFlag {
    fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::HorizontalHandles => "horizontalHandles",
            Self::Locked => "locked",
        }
    }

    /// Current value on the block or subflow named `node_id`.
    fn read(self, graph: &WorkflowGraph, node_id: &BlockId) -> Result<bool, ApplyError> {
        if let Some(block) = graph.blocks().get(node_id) {
            return Ok(match self {
                Self::Enabled => block.enabled,
                Self::HorizontalHandles => block.horizontal_handles,
                Self::Locked => block.locked,
            });
        }
        let Some(subflow) = graph.subflows().get(node_id) else {
            return Err(ApplyError::NotFound {
                kind: EntityKind::Block,
                id: node_id.as_str().to_owned(),
            });
        };
        match self {
            Self::Enabled => Ok(subflow.enabled),
            Self::Locked => Ok(subflow.locked),
            // Containers have no handle orientation.
            Self::HorizontalHandles => Err(ApplyError::NotToggleable {
                node_id: node_id.clone(),
                flag: self.as_str(),
            }),
        }
    }

    /// Writes `value`; call only after [`ToggleFlag::read`] succeeded for `node_id`.
    fn write(self, graph: &mut WorkflowGraph, node_id: &BlockId, value: bool) -> EntityRef {
        if let Some(block) = graph.blocks_mut().get_mut(node_id) {
            match self {
                Self::Enabled => block.enabled = value,
                Self::HorizontalHandles => block.horizontal_handles = value,
                Self::Locked => block.locked = value,
            }
            return EntityRef::block(node_id);
        }
        if let Some(subflow) = graph.subflows_mut().get_mut(node_id) {
            match self {
                Self::Enabled => subflow.enabled = value,
                Self::Locked => subflow.locked = value,
                Self::HorizontalHandles => {}
            }
        }
        EntityRef::subflow(node_id)
    }
}

fn toggle_flags(
    graph: &mut WorkflowGraph,
    data: &BatchToggleData,
    flag: ToggleFlag,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    for node_id in &data.block_ids {
        let current = flag.read(graph, node_id)?;
        let value = data.new_states.get(node_id).copied().unwrap_or(!current);
        delta.record_updated(flag.write(graph, node_id, value));
    }
    Ok(())
}
