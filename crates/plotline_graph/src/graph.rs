// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph canvas holding ordered node and edge lists.

use crate::edge::EdgeId;
use crate::node::NodeId;
use crate::string_id;
use serde::{Deserialize, Serialize};

string_id!(
    /// Unique identifier for a graph
    GraphId
);

/// A named canvas.
///
/// The graph only lists ids; the entities themselves live in the store so
/// they can be looked up across graphs. List order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Unique graph ID
    pub id: GraphId,
    /// Graph name
    pub name: String,
    /// Nodes on this canvas
    pub node_ids: Vec<NodeId>,
    /// Edges on this canvas
    pub edge_ids: Vec<EdgeId>,
}

impl Graph {
    /// Name used when none is given
    pub const DEFAULT_NAME: &'static str = "Untitled Graph";

    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(GraphId::new(), name)
    }

    /// Create a new empty graph with a known id
    pub fn with_id(id: GraphId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            node_ids: Vec::new(),
            edge_ids: Vec::new(),
        }
    }

    /// Whether the edge is listed on this canvas
    pub fn contains_edge(&self, edge_id: &EdgeId) -> bool {
        self.edge_ids.contains(edge_id)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}
