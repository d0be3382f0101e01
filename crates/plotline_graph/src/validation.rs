// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural validation of graphs.
//!
//! Validation never fails: every problem is reported as an advisory
//! [`ValidationWarning`] for the editor to surface next to the node.

use crate::graph::GraphId;
use crate::node::{NodeData, NodeId};
use crate::store::StoreSnapshot;
use std::collections::BTreeMap;

/// Structural rule a warning was raised by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidationRule {
    /// A choice needs at least two outgoing edges
    ChoiceMinEdges,
    /// Every outgoing edge of a choice needs a label
    ChoiceEdgeLabel,
    /// An end node has no outgoing edges
    EndNoOutput,
    /// A jump needs a target node
    JumpNeedsTarget,
    /// An edge must reference existing pins on both ends
    BrokenEdge,
}

impl ValidationRule {
    /// Rule identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChoiceMinEdges => "choice-min-edges",
            Self::ChoiceEdgeLabel => "choice-edge-label",
            Self::EndNoOutput => "end-no-output",
            Self::JumpNeedsTarget => "jump-needs-target",
            Self::BrokenEdge => "broken-edge",
        }
    }
}

impl std::fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An advisory structural warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Offending node; `None` for graph-level problems such as broken edges
    pub node_id: Option<NodeId>,
    /// Human-readable description
    pub message: String,
    /// Rule that raised the warning
    pub rule: ValidationRule,
}

impl ValidationWarning {
    fn node(node_id: &NodeId, rule: ValidationRule, message: impl Into<String>) -> Self {
        Self {
            node_id: Some(node_id.clone()),
            message: message.into(),
            rule,
        }
    }
}

/// Validate one graph.
///
/// Node rules run in node-list order, followed by broken-edge checks in
/// edge-list order. An unknown graph yields no warnings.
pub fn validate_graph(snapshot: &StoreSnapshot, graph_id: &GraphId) -> Vec<ValidationWarning> {
    let Some(graph) = snapshot.graph(graph_id) else {
        return Vec::new();
    };

    let mut warnings = Vec::new();

    for node in snapshot.graph_nodes(graph_id) {
        let outgoing: Vec<_> = snapshot
            .outgoing_edges(&node.id)
            .into_iter()
            .filter(|e| graph.contains_edge(&e.id))
            .collect();

        match &node.data {
            NodeData::Choice { .. } => {
                if outgoing.len() < 2 {
                    warnings.push(ValidationWarning::node(
                        &node.id,
                        ValidationRule::ChoiceMinEdges,
                        format!(
                            "Choice node has {} outgoing edge(s), needs at least 2",
                            outgoing.len()
                        ),
                    ));
                }
                for _ in outgoing.iter().filter(|e| e.is_unlabeled()) {
                    warnings.push(ValidationWarning::node(
                        &node.id,
                        ValidationRule::ChoiceEdgeLabel,
                        "Choice edge missing label",
                    ));
                }
            }
            NodeData::End if !outgoing.is_empty() => {
                warnings.push(ValidationWarning::node(
                    &node.id,
                    ValidationRule::EndNoOutput,
                    "End node should have no outgoing edges",
                ));
            }
            NodeData::Jump { target_node_id, .. }
                if target_node_id.as_ref().map_or(true, |t| t.as_str().is_empty()) =>
            {
                warnings.push(ValidationWarning::node(
                    &node.id,
                    ValidationRule::JumpNeedsTarget,
                    "Jump node has no target",
                ));
            }
            _ => {}
        }
    }

    for edge in snapshot.graph_edges(graph_id) {
        if snapshot.pin(&edge.from_pin_id).is_none() {
            warnings.push(ValidationWarning {
                node_id: None,
                message: format!("Edge {} references non-existent source pin", edge.id),
                rule: ValidationRule::BrokenEdge,
            });
        }
        if snapshot.pin(&edge.to_pin_id).is_none() {
            warnings.push(ValidationWarning {
                node_id: None,
                message: format!("Edge {} references non-existent target pin", edge.id),
                rule: ValidationRule::BrokenEdge,
            });
        }
    }

    warnings
}

/// Validate every graph, keyed by graph id
pub fn validate_project(snapshot: &StoreSnapshot) -> BTreeMap<GraphId, Vec<ValidationWarning>> {
    snapshot
        .graphs
        .keys()
        .map(|id| (id.clone(), validate_graph(snapshot, id)))
        .collect()
}

/// Count warnings per rule
pub fn rule_counts(warnings: &[ValidationWarning]) -> BTreeMap<ValidationRule, usize> {
    let mut counts = BTreeMap::new();
    for warning in warnings {
        *counts.entry(warning.rule).or_insert(0) += 1;
    }
    counts
}
