// SPDX-License-Identifier: MIT OR Apache-2.0
//! Entity store owning graphs, nodes, pins and edges.
//!
//! All four collections are keyed by globally unique ids so any entity can be
//! looked up without knowing which graph it sits in. Mutators keep the
//! collections referentially consistent:
//! - deleting a node removes its pins and every edge touching them
//! - deleting a container node removes its inner graph, recursively
//! - removing a pin removes every edge touching it
//!
//! Mutators never fail. A request naming an id that does not resolve is
//! dropped and logged, so interactive editing can't be interrupted mid-gesture.

use crate::edge::{Edge, EdgeId, EdgeUpdate};
use crate::graph::{Graph, GraphId};
use crate::node::{Node, NodeId, NodeType, Position};
use crate::pin::{Pin, PinDirection, PinId, PinUpdate};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Complete entity state of a store.
///
/// This is the unit captured by undo history and swapped in by hydration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Graphs by ID
    pub graphs: IndexMap<GraphId, Graph>,
    /// Nodes by ID
    pub nodes: IndexMap<NodeId, Node>,
    /// Pins by ID
    pub pins: IndexMap<PinId, Pin>,
    /// Edges by ID
    pub edges: IndexMap<EdgeId, Edge>,
}

impl StoreSnapshot {
    /// Get a graph by ID
    pub fn graph(&self, graph_id: &GraphId) -> Option<&Graph> {
        self.graphs.get(graph_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Get a pin by ID
    pub fn pin(&self, pin_id: &PinId) -> Option<&Pin> {
        self.pins.get(pin_id)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.get(edge_id)
    }

    /// Pins owned by a node, in creation order
    pub fn pins_for_node<'a>(&'a self, node_id: &'a NodeId) -> impl Iterator<Item = &'a Pin> + 'a {
        self.pins.values().filter(move |p| p.node_id == *node_id)
    }

    /// Pins owned by a node in one direction, in creation order
    pub fn node_pins<'a>(
        &'a self,
        node_id: &'a NodeId,
        direction: PinDirection,
    ) -> impl Iterator<Item = &'a Pin> + 'a {
        self.pins_for_node(node_id).filter(move |p| p.direction == direction)
    }

    /// Edges leaving any output pin of a node
    pub fn outgoing_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        let outputs: HashSet<&PinId> = self.node_pins(node_id, PinDirection::Out).map(|p| &p.id).collect();
        self.edges
            .values()
            .filter(|e| outputs.contains(&e.from_pin_id))
            .collect()
    }

    /// Existing nodes listed on a graph, in list order
    pub fn graph_nodes<'a>(&'a self, graph_id: &GraphId) -> impl Iterator<Item = &'a Node> + 'a {
        self.graphs
            .get(graph_id)
            .into_iter()
            .flat_map(|g| g.node_ids.iter())
            .filter_map(move |id| self.nodes.get(id))
    }

    /// Existing edges listed on a graph, in list order
    pub fn graph_edges<'a>(&'a self, graph_id: &GraphId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.graphs
            .get(graph_id)
            .into_iter()
            .flat_map(|g| g.edge_ids.iter())
            .filter_map(move |id| self.edges.get(id))
    }

    /// Graph that owns the node a pin belongs to
    pub fn graph_of_pin(&self, pin_id: &PinId) -> Option<&GraphId> {
        let pin = self.pins.get(pin_id)?;
        let node = self.nodes.get(&pin.node_id)?;
        Some(&node.graph_id)
    }

    fn prune_edges_from_graphs(&mut self, removed: &HashSet<EdgeId>) {
        if removed.is_empty() {
            return;
        }
        for graph in self.graphs.values_mut() {
            graph.edge_ids.retain(|id| !removed.contains(id));
        }
    }
}

/// The entity store.
///
/// Holds one [`StoreSnapshot`] plus the active graph that node creation falls
/// back to. The active graph is navigation state and is not part of the
/// snapshot.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    snapshot: StoreSnapshot,
    active_graph: Option<GraphId>,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entity state
    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    /// Replace the entity state, returning the previous one.
    ///
    /// The active graph is left as is.
    pub fn replace(&mut self, snapshot: StoreSnapshot) -> StoreSnapshot {
        std::mem::replace(&mut self.snapshot, snapshot)
    }

    /// Atomically replace the whole store state
    pub fn hydrate(&mut self, snapshot: StoreSnapshot, active_graph: Option<GraphId>) {
        debug!(
            graphs = snapshot.graphs.len(),
            nodes = snapshot.nodes.len(),
            pins = snapshot.pins.len(),
            edges = snapshot.edges.len(),
            "Hydrated entity store"
        );
        self.snapshot = snapshot;
        self.active_graph = active_graph;
    }

    /// Graph new nodes are placed in when no graph is given
    pub fn active_graph(&self) -> Option<&GraphId> {
        self.active_graph.as_ref()
    }

    /// Set the active graph
    pub fn set_active_graph(&mut self, graph_id: GraphId) {
        self.active_graph = Some(graph_id);
    }

    /// Get a graph by ID
    pub fn graph(&self, graph_id: &GraphId) -> Option<&Graph> {
        self.snapshot.graph(graph_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.snapshot.node(node_id)
    }

    /// Get a pin by ID
    pub fn pin(&self, pin_id: &PinId) -> Option<&Pin> {
        self.snapshot.pin(pin_id)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.snapshot.edge(edge_id)
    }

    /// Create an empty graph
    pub fn create_graph(&mut self, name: impl Into<String>) -> GraphId {
        let graph = Graph::new(name);
        let id = graph.id.clone();
        debug!(graph = %id, name = %graph.name, "Created graph");
        self.snapshot.graphs.insert(id.clone(), graph);
        id
    }

    /// Create a node with its default pins.
    ///
    /// The node goes into `graph_id`, or the active graph when `None`.
    /// Container nodes get a fresh inner graph. If the target graph does not
    /// resolve, nothing is inserted and the returned id refers to nothing.
    pub fn create_node(&mut self, kind: NodeType, position: Position, graph_id: Option<&GraphId>) -> NodeId {
        let Some(target) = graph_id.or(self.active_graph.as_ref()).cloned() else {
            warn!(node_type = %kind, "No target graph for new node");
            return NodeId::new();
        };
        if !self.snapshot.graphs.contains_key(&target) {
            warn!(node_type = %kind, graph = %target, "Target graph not found for new node");
            return NodeId::new();
        }

        let node = Node::new(kind, position, target.clone());
        let node_id = node.id.clone();

        let layout = kind.default_pins();
        for _ in 0..layout.input_count {
            let pin = Pin::new(node_id.clone(), PinDirection::In);
            self.snapshot.pins.insert(pin.id.clone(), pin);
        }
        for index in 0..layout.output_count {
            let pin = Pin::new(node_id.clone(), PinDirection::Out)
                .with_name(layout.output_name(index).map(str::to_string));
            self.snapshot.pins.insert(pin.id.clone(), pin);
        }

        if let Some(inner_id) = node.data.inner_graph_id() {
            let name = kind.inner_graph_name().unwrap_or(Graph::DEFAULT_NAME);
            self.snapshot
                .graphs
                .insert(inner_id.clone(), Graph::with_id(inner_id.clone(), name));
        }

        if let Some(graph) = self.snapshot.graphs.get_mut(&target) {
            graph.node_ids.push(node_id.clone());
        }
        self.snapshot.nodes.insert(node_id.clone(), node);

        debug!(node = %node_id, node_type = %kind, graph = %target, "Created node");
        node_id
    }

    /// Delete nodes with their pins, touching edges and nested graphs.
    ///
    /// Ids that do not resolve are skipped.
    pub fn delete_nodes(&mut self, node_ids: &[NodeId]) {
        let snapshot = &mut self.snapshot;

        // Expand containers into their inner graphs, at any depth
        let mut doomed_nodes: IndexSet<NodeId> = IndexSet::new();
        let mut doomed_graphs: IndexSet<GraphId> = IndexSet::new();
        let mut pending: Vec<NodeId> = node_ids.to_vec();
        while let Some(node_id) = pending.pop() {
            let Some(node) = snapshot.nodes.get(&node_id) else {
                continue;
            };
            if !doomed_nodes.insert(node_id) {
                continue;
            }
            if let Some(inner_id) = node.data.inner_graph_id() {
                if doomed_graphs.insert(inner_id.clone()) {
                    if let Some(inner) = snapshot.graphs.get(inner_id) {
                        pending.extend(inner.node_ids.iter().cloned());
                    }
                }
            }
        }
        if doomed_nodes.is_empty() {
            return;
        }

        let doomed_pins: HashSet<PinId> = snapshot
            .pins
            .values()
            .filter(|p| doomed_nodes.contains(&p.node_id))
            .map(|p| p.id.clone())
            .collect();

        let mut doomed_edges: HashSet<EdgeId> = snapshot
            .edges
            .values()
            .filter(|e| doomed_pins.contains(&e.from_pin_id) || doomed_pins.contains(&e.to_pin_id))
            .map(|e| e.id.clone())
            .collect();
        for graph_id in &doomed_graphs {
            if let Some(graph) = snapshot.graphs.get(graph_id) {
                doomed_edges.extend(graph.edge_ids.iter().cloned());
            }
        }

        snapshot.nodes.retain(|id, _| !doomed_nodes.contains(id));
        snapshot.pins.retain(|id, _| !doomed_pins.contains(id));
        snapshot.edges.retain(|id, _| !doomed_edges.contains(id));
        snapshot.graphs.retain(|id, _| !doomed_graphs.contains(id));
        for graph in snapshot.graphs.values_mut() {
            graph.node_ids.retain(|id| !doomed_nodes.contains(id));
            graph.edge_ids.retain(|id| !doomed_edges.contains(id));
        }

        debug!(
            nodes = doomed_nodes.len(),
            pins = doomed_pins.len(),
            edges = doomed_edges.len(),
            graphs = doomed_graphs.len(),
            "Deleted nodes"
        );
    }

    /// Move a node
    pub fn move_node(&mut self, node_id: &NodeId, position: Position) {
        match self.snapshot.nodes.get_mut(node_id) {
            Some(node) => node.position = position,
            None => warn!(node = %node_id, "Cannot move missing node"),
        }
    }

    /// Shallow-merge a JSON object into a node's payload.
    ///
    /// The node type never changes and a container keeps its inner graph.
    /// Returns `false` and leaves the node untouched when the node is missing,
    /// the patch names a field the node type does not have, or the merged
    /// payload does not fit the node type.
    pub fn update_node_data(&mut self, node_id: &NodeId, patch: &Value) -> bool {
        let Some(node) = self.snapshot.nodes.get_mut(node_id) else {
            warn!(node = %node_id, "Cannot update data of missing node");
            return false;
        };
        let Some(fields) = patch.as_object() else {
            warn!(node = %node_id, "Node data patch is not an object");
            return false;
        };
        let kind = node.data.kind();
        if let Some(key) = fields.keys().find(|k| *k != "type" && !kind.data_fields().contains(&k.as_str())) {
            warn!(node = %node_id, key = %key, "Unknown {kind} data field in patch");
            return false;
        }
        let merged = match node.data.merged(fields) {
            Ok(merged) => merged,
            Err(err) => {
                warn!(node = %node_id, error = %err, "Rejected node data patch");
                return false;
            }
        };
        if merged.inner_graph_id() != node.data.inner_graph_id() {
            warn!(node = %node_id, "Node data patch may not rebind the inner graph");
            return false;
        }
        node.data = merged;
        true
    }

    /// Add a pin to a node.
    ///
    /// If the node does not resolve, nothing is inserted.
    pub fn add_pin(&mut self, node_id: &NodeId, direction: PinDirection, name: Option<String>) -> PinId {
        let pin = Pin::new(node_id.clone(), direction).with_name(name);
        let pin_id = pin.id.clone();
        if !self.snapshot.nodes.contains_key(node_id) {
            warn!(node = %node_id, "Cannot add pin to missing node");
            return pin_id;
        }
        self.snapshot.pins.insert(pin_id.clone(), pin);
        pin_id
    }

    /// Remove a pin and every edge touching it
    pub fn remove_pin(&mut self, pin_id: &PinId) {
        let removed: HashSet<EdgeId> = self
            .snapshot
            .edges
            .values()
            .filter(|e| e.involves_pin(pin_id))
            .map(|e| e.id.clone())
            .collect();
        self.snapshot.edges.retain(|id, _| !removed.contains(id));
        self.snapshot.prune_edges_from_graphs(&removed);
        self.snapshot.pins.shift_remove(pin_id);
        debug!(pin = %pin_id, edges = removed.len(), "Removed pin");
    }

    /// Update a pin's editable fields
    pub fn update_pin(&mut self, pin_id: &PinId, update: PinUpdate) {
        match self.snapshot.pins.get_mut(pin_id) {
            Some(pin) => pin.apply(update),
            None => warn!(pin = %pin_id, "Cannot update missing pin"),
        }
    }

    /// Connect two pins.
    ///
    /// The edge joins the graph of the source pin's node. If the source pin or
    /// its node does not resolve, nothing is inserted and the returned id
    /// refers to nothing. The target pin is not checked; a dangling target is
    /// reported by validation.
    pub fn create_edge(
        &mut self,
        from_pin_id: &PinId,
        to_pin_id: &PinId,
        label: Option<String>,
        color: Option<String>,
    ) -> EdgeId {
        let mut edge = Edge::new(from_pin_id.clone(), to_pin_id.clone());
        edge.label = label;
        edge.color = color;
        let edge_id = edge.id.clone();

        let Some(graph_id) = self.snapshot.graph_of_pin(from_pin_id).cloned() else {
            warn!(edge = %edge_id, from = %from_pin_id, "Source pin does not resolve, edge dropped");
            return edge_id;
        };
        let Some(graph) = self.snapshot.graphs.get_mut(&graph_id) else {
            warn!(edge = %edge_id, graph = %graph_id, "Source graph not found, edge dropped");
            return edge_id;
        };
        graph.edge_ids.push(edge_id.clone());
        self.snapshot.edges.insert(edge_id.clone(), edge);

        debug!(edge = %edge_id, graph = %graph_id, "Created edge");
        edge_id
    }

    /// Delete edges
    pub fn delete_edges(&mut self, edge_ids: &[EdgeId]) {
        let removed: HashSet<EdgeId> = edge_ids.iter().cloned().collect();
        self.snapshot.edges.retain(|id, _| !removed.contains(id));
        self.snapshot.prune_edges_from_graphs(&removed);
    }

    /// Update an edge's editable fields
    pub fn update_edge(&mut self, edge_id: &EdgeId, update: EdgeUpdate) {
        match self.snapshot.edges.get_mut(edge_id) {
            Some(edge) => edge.apply(update),
            None => warn!(edge = %edge_id, "Cannot update missing edge"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeData;
    use serde_json::json;

    fn store_with_graph() -> (EntityStore, GraphId) {
        let mut store = EntityStore::new();
        let graph_id = store.create_graph("Test");
        store.set_active_graph(graph_id.clone());
        (store, graph_id)
    }

    fn first_pin(store: &EntityStore, node_id: &NodeId, direction: PinDirection) -> PinId {
        store
            .snapshot()
            .node_pins(node_id, direction)
            .next()
            .map(|p| p.id.clone())
            .unwrap()
    }

    fn connect(store: &mut EntityStore, from: &NodeId, to: &NodeId) -> EdgeId {
        let out = first_pin(store, from, PinDirection::Out);
        let inp = first_pin(store, to, PinDirection::In);
        store.create_edge(&out, &inp, None, None)
    }

    #[test]
    fn test_create_graph() {
        let (store, graph_id) = store_with_graph();
        assert_eq!(store.graph(&graph_id).unwrap().name, "Test");
    }

    #[test]
    fn test_create_node_with_default_pins() {
        let (mut store, graph_id) = store_with_graph();
        let node_id = store.create_node(NodeType::Line, Position::new(100.0, 200.0), None);

        let node = store.node(&node_id).unwrap();
        assert_eq!(node.node_type(), NodeType::Line);
        assert_eq!(node.position, Position::new(100.0, 200.0));
        assert_eq!(node.graph_id, graph_id);
        assert_eq!(store.graph(&graph_id).unwrap().node_ids, vec![node_id.clone()]);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.node_pins(&node_id, PinDirection::In).count(), 1);
        assert_eq!(snapshot.node_pins(&node_id, PinDirection::Out).count(), 1);
    }

    #[test]
    fn test_choice_node_output_names() {
        let (mut store, _) = store_with_graph();
        let node_id = store.create_node(NodeType::Choice, Position::default(), None);

        let names: Vec<_> = store
            .snapshot()
            .node_pins(&node_id, PinDirection::Out)
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, vec![Some("Option 1".to_string()), Some("Option 2".to_string())]);
    }

    #[test]
    fn test_container_gets_inner_graph() {
        let (mut store, _) = store_with_graph();
        let node_id = store.create_node(NodeType::DialogueContainer, Position::default(), None);

        let inner_id = store.node(&node_id).unwrap().data.inner_graph_id().cloned().unwrap();
        let inner = store.graph(&inner_id).unwrap();
        assert_eq!(inner.name, "Dialogue Inner");
        assert!(inner.node_ids.is_empty());
    }

    #[test]
    fn test_create_node_in_missing_graph_inserts_nothing() {
        let mut store = EntityStore::new();
        let node_id = store.create_node(NodeType::Line, Position::default(), None);
        assert!(store.node(&node_id).is_none());

        let node_id = store.create_node(NodeType::Line, Position::default(), Some(&"nope".into()));
        assert!(store.node(&node_id).is_none());
        assert!(store.snapshot().pins.is_empty());
    }

    #[test]
    fn test_delete_node_cascades_to_pins_and_edges() {
        let (mut store, graph_id) = store_with_graph();
        let a = store.create_node(NodeType::Line, Position::default(), None);
        let b = store.create_node(NodeType::Line, Position::new(100.0, 0.0), None);
        let edge_id = connect(&mut store, &a, &b);
        assert!(store.edge(&edge_id).is_some());

        store.delete_nodes(&[a.clone()]);

        assert!(store.node(&a).is_none());
        assert!(store.edge(&edge_id).is_none());
        assert_eq!(store.snapshot().pins_for_node(&a).count(), 0);
        let graph = store.graph(&graph_id).unwrap();
        assert_eq!(graph.node_ids, vec![b.clone()]);
        assert!(graph.edge_ids.is_empty());
        assert_eq!(store.snapshot().pins_for_node(&b).count(), 2);
    }

    #[test]
    fn test_delete_nested_containers_recursively() {
        let (mut store, root) = store_with_graph();
        let outer = store.create_node(NodeType::FlowFragment, Position::default(), None);
        let level1 = store.node(&outer).unwrap().data.inner_graph_id().cloned().unwrap();

        let inner = store.create_node(NodeType::DialogueContainer, Position::default(), Some(&level1));
        let level2 = store.node(&inner).unwrap().data.inner_graph_id().cloned().unwrap();

        let x = store.create_node(NodeType::Line, Position::default(), Some(&level2));
        let y = store.create_node(NodeType::End, Position::default(), Some(&level2));
        let deep_edge = connect(&mut store, &x, &y);

        let sibling = store.create_node(NodeType::Hub, Position::default(), None);

        store.delete_nodes(&[outer.clone()]);

        let snapshot = store.snapshot();
        for id in [&outer, &inner, &x, &y] {
            assert!(snapshot.node(id).is_none());
            assert_eq!(snapshot.pins_for_node(id).count(), 0);
        }
        assert!(snapshot.edge(&deep_edge).is_none());
        assert!(snapshot.graph(&level1).is_none());
        assert!(snapshot.graph(&level2).is_none());
        assert_eq!(snapshot.graph(&root).unwrap().node_ids, vec![sibling.clone()]);
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.graphs.len(), 1);
    }

    #[test]
    fn test_delete_missing_node_is_noop() {
        let (mut store, _) = store_with_graph();
        store.create_node(NodeType::Line, Position::default(), None);
        let before = store.snapshot().clone();
        store.delete_nodes(&["missing".into()]);
        assert_eq!(store.snapshot(), &before);
    }

    #[test]
    fn test_remove_pin_cascades_to_edges() {
        let (mut store, graph_id) = store_with_graph();
        let a = store.create_node(NodeType::Choice, Position::default(), None);
        let b = store.create_node(NodeType::Line, Position::new(100.0, 0.0), None);

        let out = first_pin(&store, &a, PinDirection::Out);
        let inp = first_pin(&store, &b, PinDirection::In);
        let edge_id = store.create_edge(&out, &inp, None, None);

        store.remove_pin(&out);

        assert!(store.pin(&out).is_none());
        assert!(store.edge(&edge_id).is_none());
        assert!(store.graph(&graph_id).unwrap().edge_ids.is_empty());
    }

    #[test]
    fn test_create_and_delete_edges() {
        let (mut store, graph_id) = store_with_graph();
        let a = store.create_node(NodeType::Line, Position::default(), None);
        let b = store.create_node(NodeType::Line, Position::new(100.0, 0.0), None);
        let out = first_pin(&store, &a, PinDirection::Out);
        let inp = first_pin(&store, &b, PinDirection::In);

        let edge_id = store.create_edge(&out, &inp, Some("test label".into()), None);
        assert_eq!(store.edge(&edge_id).unwrap().label.as_deref(), Some("test label"));
        assert_eq!(store.graph(&graph_id).unwrap().edge_ids, vec![edge_id.clone()]);

        store.delete_edges(&[edge_id.clone()]);
        assert!(store.edge(&edge_id).is_none());
        assert!(store.graph(&graph_id).unwrap().edge_ids.is_empty());
    }

    #[test]
    fn test_create_edge_from_unknown_pin_is_dropped() {
        let (mut store, graph_id) = store_with_graph();
        let b = store.create_node(NodeType::Line, Position::default(), None);
        let inp = first_pin(&store, &b, PinDirection::In);

        let edge_id = store.create_edge(&"ghost".into(), &inp, None, None);
        assert!(store.edge(&edge_id).is_none());
        assert!(store.graph(&graph_id).unwrap().edge_ids.is_empty());
    }

    #[test]
    fn test_edge_joins_source_node_graph() {
        let (mut store, _) = store_with_graph();
        let container = store.create_node(NodeType::FlowFragment, Position::default(), None);
        let inner = store.node(&container).unwrap().data.inner_graph_id().cloned().unwrap();
        let a = store.create_node(NodeType::Line, Position::default(), Some(&inner));
        let b = store.create_node(NodeType::End, Position::default(), Some(&inner));

        let edge_id = connect(&mut store, &a, &b);
        assert_eq!(store.graph(&inner).unwrap().edge_ids, vec![edge_id]);
    }

    #[test]
    fn test_update_edge_properties() {
        let (mut store, _) = store_with_graph();
        let a = store.create_node(NodeType::Line, Position::default(), None);
        let b = store.create_node(NodeType::Line, Position::new(100.0, 0.0), None);
        let edge_id = connect(&mut store, &a, &b);

        store.update_edge(&edge_id, EdgeUpdate::default().label("updated").color("#ff0000"));

        let edge = store.edge(&edge_id).unwrap();
        assert_eq!(edge.label.as_deref(), Some("updated"));
        assert_eq!(edge.color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_update_node_data_merges_fields() {
        let (mut store, _) = store_with_graph();
        let node_id = store.create_node(NodeType::Line, Position::default(), None);

        assert!(store.update_node_data(&node_id, &json!({"text": "Hello world", "speakerId": "alice"})));
        assert!(store.update_node_data(&node_id, &json!({"type": "end", "text": "Hi"})));

        let node = store.node(&node_id).unwrap();
        assert_eq!(
            node.data,
            NodeData::Line {
                speaker_id: Some("alice".into()),
                text: "Hi".into()
            }
        );
    }

    #[test]
    fn test_update_node_data_rejects_bad_patch() {
        let (mut store, _) = store_with_graph();
        let node_id = store.create_node(NodeType::FlowFragment, Position::default(), None);
        let before = store.node(&node_id).unwrap().clone();

        assert!(!store.update_node_data(&node_id, &json!({"innerGraphId": "elsewhere"})));
        assert!(!store.update_node_data(&node_id, &json!({"label": 3})));
        assert!(!store.update_node_data(&node_id, &json!("label")));
        assert!(!store.update_node_data(&node_id, &json!({"label": "Act", "speakerId": "alice"})));
        assert!(!store.update_node_data(&"missing".into(), &json!({})));
        assert_eq!(store.node(&node_id).unwrap(), &before);
    }

    #[test]
    fn test_add_and_update_pin() {
        let (mut store, _) = store_with_graph();
        let node_id = store.create_node(NodeType::Hub, Position::default(), None);

        let pin_id = store.add_pin(&node_id, PinDirection::Out, Some("Extra".into()));
        store.update_pin(&pin_id, PinUpdate::default().instruction_expr("visited = true"));

        let pin = store.pin(&pin_id).unwrap();
        assert_eq!(pin.node_id, node_id);
        assert_eq!(pin.name.as_deref(), Some("Extra"));
        assert_eq!(pin.instruction_expr.as_deref(), Some("visited = true"));
        assert_eq!(store.snapshot().node_pins(&node_id, PinDirection::Out).count(), 2);

        let orphan = store.add_pin(&"missing".into(), PinDirection::In, None);
        assert!(store.pin(&orphan).is_none());
    }

    #[test]
    fn test_move_node() {
        let (mut store, _) = store_with_graph();
        let node_id = store.create_node(NodeType::Line, Position::new(10.0, 20.0), None);
        store.move_node(&node_id, Position::new(30.0, 40.0));
        assert_eq!(store.node(&node_id).unwrap().position, Position::new(30.0, 40.0));
    }

    #[test]
    fn test_ids_are_global() {
        let (mut store, _) = store_with_graph();
        let other = store.create_graph("Other");
        let a = store.create_node(NodeType::Line, Position::default(), None);
        let b = store.create_node(NodeType::Line, Position::default(), Some(&other));
        assert_ne!(a, b);
        assert_eq!(store.node(&b).unwrap().graph_id, other);
    }
}
