// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structural comparison of two workflow states.
//!
//! A `DiffAnalysis` describes an AI-proposed change (what would be added, edited or
//! deleted). Diff operations carry it alongside the two states they switch between; it is
//! metadata about the diff itself, so inverting a diff operation leaves it untouched.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::graph::{FieldValues, WorkflowGraph};
use super::ids::{BlockId, EdgeId};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffAnalysis {
    #[serde(default)]
    pub new_blocks: Vec<BlockId>,
    #[serde(default)]
    pub edited_blocks: Vec<BlockId>,
    #[serde(default)]
    pub deleted_blocks: Vec<BlockId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_diffs: BTreeMap<BlockId, FieldDiff>,
    #[serde(default)]
    pub edge_diff: EdgeDiff,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDiff {
    pub changed_fields: Vec<String>,
    pub unchanged_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDiff {
    #[serde(default)]
    pub new_edges: Vec<EdgeId>,
    #[serde(default)]
    pub deleted_edges: Vec<EdgeId>,
    #[serde(default)]
    pub unchanged_edges: Vec<EdgeId>,
}

impl DiffAnalysis {
    pub fn between(baseline: &WorkflowGraph, proposed: &WorkflowGraph) -> Self {
        let mut analysis = Self::default();
        let empty = FieldValues::new();

        for (block_id, block) in proposed.blocks() {
            let Some(previous) = baseline.blocks().get(block_id) else {
                analysis.new_blocks.push(block_id.clone());
                continue;
            };

            let before = baseline.sub_block_values().get(block_id).unwrap_or(&empty);
            let after = proposed.sub_block_values().get(block_id).unwrap_or(&empty);
            let field_diff = diff_fields(before, after);

            if previous != block || !field_diff.changed_fields.is_empty() {
                analysis.edited_blocks.push(block_id.clone());
                analysis.field_diffs.insert(block_id.clone(), field_diff);
            }
        }

        analysis.deleted_blocks = baseline
            .blocks()
            .keys()
            .filter(|block_id| !proposed.blocks().contains_key(*block_id))
            .cloned()
            .collect();

        for (edge_id, edge) in proposed.edges() {
            match baseline.edges().get(edge_id) {
                Some(previous) if previous == edge => {
                    analysis.edge_diff.unchanged_edges.push(edge_id.clone());
                }
                Some(_) => {
                    // Rewired under the same id: the old edge goes away, a new one appears.
                    analysis.edge_diff.deleted_edges.push(edge_id.clone());
                    analysis.edge_diff.new_edges.push(edge_id.clone());
                }
                None => analysis.edge_diff.new_edges.push(edge_id.clone()),
            }
        }
        for edge_id in baseline.edges().keys() {
            if !proposed.edges().contains_key(edge_id) {
                analysis.edge_diff.deleted_edges.push(edge_id.clone());
            }
        }

        analysis
    }

    pub fn is_empty(&self) -> bool {
        self.new_blocks.is_empty()
            && self.edited_blocks.is_empty()
            && self.deleted_blocks.is_empty()
            && self.edge_diff.new_edges.is_empty()
            && self.edge_diff.deleted_edges.is_empty()
    }
}

fn diff_fields(before: &FieldValues, after: &FieldValues) -> FieldDiff {
    let keys = before.keys().chain(after.keys()).collect::<BTreeSet<_>>();
    let mut diff = FieldDiff::default();
    for key in keys {
        if before.get(key) == after.get(key) {
            diff.unchanged_fields.push(key.clone());
        } else {
            diff.changed_fields.push(key.clone());
        }
    }
    diff
}
