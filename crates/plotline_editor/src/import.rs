// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project document import.
//!
//! Import is all-or-nothing: the text is parsed, migrated and fully checked
//! into fresh values before the caller swaps anything in.

use crate::export::{GraphExport, ProjectExport};
use crate::hierarchy::{Hierarchy, TreeNode};
use crate::migrations::migrate_to_latest;
use crate::project::Project;
use plotline_graph::{Graph, GraphId, Node, NodeData, NodeId, Pin, StoreSnapshot};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use thiserror::Error;
use tracing::info;

/// Import errors
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input is not valid JSON
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Document is newer than this application
    #[error("Unsupported schema version {found}. Current version is {supported}. Please update the application.")]
    Version {
        /// Version found in the document
        found: String,
        /// Newest supported version
        supported: u32,
    },

    /// Document does not match the project schema
    #[error("Invalid project document: {0}")]
    Validation(String),
}

/// Result type for import operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// A fully checked document, ready to hydrate
#[derive(Debug, Clone)]
pub struct ImportedProject {
    /// Project metadata, characters and hierarchy
    pub project: Project,
    /// Entity state
    pub snapshot: StoreSnapshot,
    /// First graph of the document
    pub active_graph: Option<GraphId>,
}

fn invalid(message: impl Into<String>) -> ImportError {
    ImportError::Validation(message.into())
}

fn require_name(what: &str, id: impl Display, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(format!("{what} {id} has an empty name")));
    }
    Ok(())
}

/// Tracks ids seen so far for one entity kind
struct UniqueIds<T> {
    kind: &'static str,
    seen: HashSet<T>,
}

impl<T: Eq + Hash + Clone + Display> UniqueIds<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            seen: HashSet::new(),
        }
    }

    fn insert(&mut self, id: &T) -> Result<()> {
        if !self.seen.insert(id.clone()) {
            return Err(invalid(format!("duplicate {} id {id}", self.kind)));
        }
        Ok(())
    }
}

fn check_tree_names(nodes: &[TreeNode]) -> Result<()> {
    for node in nodes {
        require_name("tree node", &node.id, &node.name)?;
        check_tree_names(&node.children)?;
    }
    Ok(())
}

/// A pin must name the node listing it, in the list matching its direction
fn check_pin_owner(pin: &Pin, node_id: &NodeId, direction_matches: bool) -> Result<()> {
    if pin.node_id != *node_id {
        return Err(invalid(format!(
            "pin {} is listed under node {node_id} but belongs to {}",
            pin.id, pin.node_id
        )));
    }
    if !direction_matches {
        return Err(invalid(format!(
            "pin {} of node {node_id} is listed with the wrong direction",
            pin.id
        )));
    }
    Ok(())
}

/// Every inner graph exists, has exactly one container and does not hold
/// that container at any depth
fn check_containers(snapshot: &StoreSnapshot) -> Result<()> {
    let mut owners: HashMap<&GraphId, &Node> = HashMap::new();
    for node in snapshot.nodes.values() {
        let Some(inner) = node.data.inner_graph_id() else {
            continue;
        };
        if !snapshot.graphs.contains_key(inner) {
            return Err(invalid(format!("container {} references missing graph {inner}", node.id)));
        }
        if let Some(other) = owners.insert(inner, node) {
            return Err(invalid(format!(
                "graph {inner} is the inner graph of both {} and {}",
                other.id, node.id
            )));
        }
    }

    // Walk outwards from each container; reaching its inner graph is a cycle
    for node in snapshot.nodes.values() {
        let Some(inner) = node.data.inner_graph_id() else {
            continue;
        };
        let mut current = &node.graph_id;
        for _ in 0..=owners.len() {
            if current == inner {
                return Err(invalid(format!("container {} is nested inside its own graph {inner}", node.id)));
            }
            match owners.get(current) {
                Some(owner) => current = &owner.graph_id,
                None => break,
            }
        }
    }
    Ok(())
}

/// Normalize the document's graphs into a store snapshot
fn build_snapshot(graphs: Vec<GraphExport>) -> Result<StoreSnapshot> {
    let mut snapshot = StoreSnapshot::default();
    let mut graph_ids = UniqueIds::new("graph");
    let mut node_ids = UniqueIds::new("node");
    let mut pin_ids = UniqueIds::new("pin");
    let mut edge_ids = UniqueIds::new("edge");

    for exported in graphs {
        graph_ids.insert(&exported.id)?;
        require_name("graph", &exported.id, &exported.name)?;

        let mut graph = Graph::with_id(exported.id.clone(), exported.name);

        for node in exported.nodes {
            node_ids.insert(&node.id)?;
            let data = NodeData::from_fields(node.kind, node.data)
                .map_err(|err| invalid(format!("node {} has invalid {} data: {err}", node.id, node.kind)))?;

            for pin in &node.input_pins {
                check_pin_owner(pin, &node.id, pin.is_input())?;
            }
            for pin in &node.output_pins {
                check_pin_owner(pin, &node.id, pin.is_output())?;
            }
            for pin in node.input_pins.into_iter().chain(node.output_pins) {
                pin_ids.insert(&pin.id)?;
                snapshot.pins.insert(pin.id.clone(), pin);
            }

            graph.node_ids.push(node.id.clone());
            snapshot.nodes.insert(
                node.id.clone(),
                Node {
                    id: node.id,
                    position: node.position,
                    data,
                    graph_id: exported.id.clone(),
                },
            );
        }

        for edge in exported.edges {
            edge_ids.insert(&edge.id)?;
            graph.edge_ids.push(edge.id.clone());
            snapshot.edges.insert(edge.id.clone(), edge);
        }

        snapshot.graphs.insert(exported.id, graph);
    }

    check_containers(&snapshot)?;
    Ok(snapshot)
}

/// Parse, migrate and check a project document
pub fn import_project(json: &str) -> Result<ImportedProject> {
    let raw: Value = serde_json::from_str(json)?;
    let Value::Object(document) = raw else {
        return Err(invalid("document must be a JSON object"));
    };

    let migrated = migrate_to_latest(document)?;
    let document: ProjectExport =
        serde_json::from_value(Value::Object(migrated)).map_err(|err| invalid(err.to_string()))?;

    require_name("project", &document.id, &document.name)?;
    let mut character_ids = UniqueIds::new("character");
    for character in &document.characters {
        character_ids.insert(&character.id)?;
        require_name("character", &character.id, &character.name)?;
    }
    check_tree_names(&document.hierarchy_root)?;
    let hierarchy = Hierarchy::from_tree(&document.hierarchy_root).map_err(|err| invalid(err.to_string()))?;

    let active_graph = document.graphs.first().map(|g| g.id.clone());
    let snapshot = build_snapshot(document.graphs)?;

    let project = Project::from_parts(
        document.id,
        document.name,
        document.created_at,
        document.updated_at,
        document.characters,
        hierarchy,
    );

    info!(
        project = %project.id,
        graphs = snapshot.graphs.len(),
        nodes = snapshot.nodes.len(),
        "Imported project"
    );

    Ok(ImportedProject {
        project,
        snapshot,
        active_graph,
    })
}
