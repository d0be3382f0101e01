// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical project document.
//!
//! Export is deterministic: graphs, nodes, edges, pins and characters are
//! ordered by id, positions are rounded to one decimal, and object keys are
//! sorted at every level. The same logical state always renders to the same
//! bytes.

use crate::hierarchy::TreeNode;
use crate::project::{Character, Project, ProjectId};
use plotline_graph::{Edge, Graph, GraphId, Node, NodeId, NodeType, Pin, PinDirection, Position, StoreSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Serialization error
    #[error("Failed to serialize project: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whole-project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectExport {
    /// Document schema version
    pub schema_version: u32,
    /// Project id
    pub id: ProjectId,
    /// Project name
    pub name: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last modification timestamp
    pub updated_at: String,
    /// Characters
    pub characters: Vec<Character>,
    /// Hierarchy tree roots
    pub hierarchy_root: Vec<TreeNode>,
    /// Graphs
    pub graphs: Vec<GraphExport>,
}

/// Graph section of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    /// Graph id
    pub id: GraphId,
    /// Graph name
    pub name: String,
    /// Nodes with their pins
    pub nodes: Vec<NodeExport>,
    /// Edges
    pub edges: Vec<Edge>,
}

/// Node section of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExport {
    /// Node id
    pub id: NodeId,
    /// Node type
    #[serde(rename = "type")]
    pub kind: NodeType,
    /// Canvas position
    pub position: Position,
    /// Input pins
    pub input_pins: Vec<Pin>,
    /// Output pins
    pub output_pins: Vec<Pin>,
    /// Node payload as loose fields
    pub data: Map<String, Value>,
}

fn sorted_by_id<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> &K) -> Vec<T> {
    items.sort_by(|a, b| key(a).cmp(key(b)));
    items
}

fn export_pins(snapshot: &StoreSnapshot, node_id: &NodeId, direction: PinDirection) -> Vec<Pin> {
    let pins: Vec<Pin> = snapshot.node_pins(node_id, direction).cloned().collect();
    sorted_by_id(pins, |p: &Pin| &p.id)
}

/// Build the document for a store and its project
pub fn build_export(snapshot: &StoreSnapshot, project: &Project) -> Result<ProjectExport, ExportError> {
    let graphs: Vec<&Graph> = snapshot.graphs.values().collect();
    let mut graph_exports = Vec::with_capacity(graphs.len());

    for graph in sorted_by_id(graphs, |g| &g.id) {
        let nodes: Vec<&Node> = snapshot.graph_nodes(&graph.id).collect();
        let nodes = sorted_by_id(nodes, |n| &n.id);
        let mut node_exports = Vec::with_capacity(nodes.len());
        for node in nodes {
            node_exports.push(NodeExport {
                id: node.id.clone(),
                kind: node.node_type(),
                position: node.position.rounded(),
                input_pins: export_pins(snapshot, &node.id, PinDirection::In),
                output_pins: export_pins(snapshot, &node.id, PinDirection::Out),
                data: node.data.to_fields()?,
            });
        }

        let edges = sorted_by_id(snapshot.graph_edges(&graph.id).cloned().collect(), |e: &Edge| &e.id);

        graph_exports.push(GraphExport {
            id: graph.id.clone(),
            name: graph.name.clone(),
            nodes: node_exports,
            edges,
        });
    }

    Ok(ProjectExport {
        schema_version: project.schema_version,
        id: project.id.clone(),
        name: project.name.clone(),
        created_at: project.created_at.clone(),
        updated_at: project.updated_at.clone(),
        characters: sorted_by_id(project.characters().cloned().collect(), |c: &Character| &c.id),
        hierarchy_root: project.hierarchy().to_tree(),
        graphs: graph_exports,
    })
}

/// Render a value with recursively sorted keys and two-space indentation
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, ExportError> {
    // `Value` objects keep their keys sorted
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Export a project as canonical JSON
pub fn export_project(snapshot: &StoreSnapshot, project: &Project) -> Result<String, ExportError> {
    let document = build_export(snapshot, project)?;
    let text = to_canonical_json(&document)?;
    info!(
        project = %project.id,
        graphs = document.graphs.len(),
        bytes = text.len(),
        "Exported project"
    );
    Ok(text)
}
