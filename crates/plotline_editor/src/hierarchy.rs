// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project hierarchy tree.
//!
//! The tree is stored flat: every entry is keyed by id and holds its parent
//! and ordered children, so lookups are direct and cycle checks are an
//! ancestor walk. The nested [`TreeNode`] form is only used at the document
//! boundary.

use indexmap::IndexMap;
use plotline_graph::{string_id, GraphId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

string_id!(
    /// Unique identifier for a hierarchy entry
    TreeNodeId
);

/// Kind of hierarchy entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TreeNodeType {
    /// Plain folder
    Folder,
    /// Story chapter
    Chapter,
    /// Story arc
    Arc,
    /// Reference to a graph
    GraphRef,
    /// Reference to an external asset
    AssetRef,
}

/// One entry of the flat tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Entry id
    pub id: TreeNodeId,
    /// Entry kind
    pub kind: TreeNodeType,
    /// Display name
    pub name: String,
    /// Referenced graph, for `graphRef` entries
    pub graph_id: Option<GraphId>,
    /// Parent entry, `None` at root level
    pub parent: Option<TreeNodeId>,
    /// Ordered children
    pub children: Vec<TreeNodeId>,
}

/// Nested document form of a hierarchy entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Entry id
    pub id: TreeNodeId,
    /// Entry kind
    #[serde(rename = "type")]
    pub kind: TreeNodeType,
    /// Display name
    pub name: String,
    /// Ordered children
    pub children: Vec<TreeNode>,
    /// Referenced graph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<GraphId>,
}

/// Hierarchy could not be built from nested form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Duplicate tree node id: {0}")]
pub struct DuplicateTreeNode(pub TreeNodeId);

/// The hierarchy tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    entries: IndexMap<TreeNodeId, TreeEntry>,
    roots: Vec<TreeNodeId>,
}

impl Hierarchy {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from nested form, rejecting repeated ids
    pub fn from_tree(roots: &[TreeNode]) -> Result<Self, DuplicateTreeNode> {
        let mut hierarchy = Self::new();
        let mut pending: Vec<(Option<TreeNodeId>, &TreeNode)> = roots.iter().rev().map(|n| (None, n)).collect();

        while let Some((parent, node)) = pending.pop() {
            if hierarchy.entries.contains_key(&node.id) {
                return Err(DuplicateTreeNode(node.id.clone()));
            }
            hierarchy.entries.insert(
                node.id.clone(),
                TreeEntry {
                    id: node.id.clone(),
                    kind: node.kind,
                    name: node.name.clone(),
                    graph_id: node.graph_id.clone(),
                    parent: parent.clone(),
                    children: node.children.iter().map(|c| c.id.clone()).collect(),
                },
            );
            if parent.is_none() {
                hierarchy.roots.push(node.id.clone());
            }
            pending.extend(node.children.iter().rev().map(|c| (Some(node.id.clone()), c)));
        }

        Ok(hierarchy)
    }

    /// Convert to nested form, preserving sibling order
    pub fn to_tree(&self) -> Vec<TreeNode> {
        self.roots.iter().filter_map(|id| self.nested(id)).collect()
    }

    fn nested(&self, id: &TreeNodeId) -> Option<TreeNode> {
        let entry = self.entries.get(id)?;
        Some(TreeNode {
            id: entry.id.clone(),
            kind: entry.kind,
            name: entry.name.clone(),
            children: entry.children.iter().filter_map(|c| self.nested(c)).collect(),
            graph_id: entry.graph_id.clone(),
        })
    }

    /// Get an entry by id
    pub fn get(&self, id: &TreeNodeId) -> Option<&TreeEntry> {
        self.entries.get(id)
    }

    /// Parent of an entry, `None` for roots and unknown ids
    pub fn parent(&self, id: &TreeNodeId) -> Option<&TreeNodeId> {
        self.entries.get(id)?.parent.as_ref()
    }

    /// Ordered children of an entry, or the roots for `None`
    pub fn children(&self, parent: Option<&TreeNodeId>) -> &[TreeNodeId] {
        match parent {
            None => &self.roots,
            Some(id) => self.entries.get(id).map(|e| e.children.as_slice()).unwrap_or(&[]),
        }
    }

    /// Ordered root entries
    pub fn roots(&self) -> &[TreeNodeId] {
        &self.roots
    }

    /// Number of entries at any depth
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `node` lies strictly below `ancestor`
    pub fn is_descendant(&self, ancestor: &TreeNodeId, node: &TreeNodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn siblings_mut(&mut self, parent: Option<&TreeNodeId>) -> Option<&mut Vec<TreeNodeId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(id) => self.entries.get_mut(id).map(|e| &mut e.children),
        }
    }

    /// Append a new entry under `parent`, or at root level for `None`.
    ///
    /// If the parent does not resolve nothing is inserted.
    pub fn add(
        &mut self,
        parent: Option<&TreeNodeId>,
        kind: TreeNodeType,
        name: impl Into<String>,
        graph_id: Option<GraphId>,
    ) -> TreeNodeId {
        let id = TreeNodeId::new();
        let Some(siblings) = self.siblings_mut(parent) else {
            warn!(tree_node = %id, "Parent tree node not found, entry dropped");
            return id;
        };
        siblings.push(id.clone());
        self.entries.insert(
            id.clone(),
            TreeEntry {
                id: id.clone(),
                kind,
                name: name.into(),
                graph_id,
                parent: parent.cloned(),
                children: Vec::new(),
            },
        );
        debug!(tree_node = %id, "Added tree node");
        id
    }

    /// Detach an entry with its whole subtree. Returns whether anything changed.
    pub fn remove(&mut self, id: &TreeNodeId) -> bool {
        let Some(entry) = self.entries.get(id) else {
            return false;
        };
        let parent = entry.parent.clone();
        if let Some(siblings) = self.siblings_mut(parent.as_ref()) {
            siblings.retain(|c| c != id);
        }

        let mut removed: HashSet<TreeNodeId> = HashSet::new();
        let mut pending = vec![id.clone()];
        while let Some(current) = pending.pop() {
            if let Some(entry) = self.entries.get(&current) {
                pending.extend(entry.children.iter().cloned());
            }
            removed.insert(current);
        }
        self.entries.retain(|key, _| !removed.contains(key));

        debug!(tree_node = %id, removed = removed.len(), "Removed tree node");
        true
    }

    /// Move an entry with its subtree under `new_parent` at `index`.
    ///
    /// The index is clamped to the sibling count. Moving an entry under
    /// itself, one of its descendants, or a missing parent is rejected and
    /// leaves the tree untouched. Returns whether anything changed.
    pub fn move_to(&mut self, id: &TreeNodeId, new_parent: Option<&TreeNodeId>, index: usize) -> bool {
        let Some(entry) = self.entries.get(id) else {
            warn!(tree_node = %id, "Cannot move missing tree node");
            return false;
        };
        let old_parent = entry.parent.clone();

        if let Some(target) = new_parent {
            if target == id || self.is_descendant(id, target) {
                warn!(tree_node = %id, parent = %target, "Rejected cyclic tree move");
                return false;
            }
            if !self.entries.contains_key(target) {
                warn!(tree_node = %id, parent = %target, "Target parent not found");
                return false;
            }
        }

        let old_index = self.children(old_parent.as_ref()).iter().position(|c| c == id);
        if let Some(siblings) = self.siblings_mut(old_parent.as_ref()) {
            siblings.retain(|c| c != id);
        }
        let mut new_index = None;
        if let Some(siblings) = self.siblings_mut(new_parent) {
            let index = index.min(siblings.len());
            siblings.insert(index, id.clone());
            new_index = Some(index);
        }
        if let Some(entry) = self.entries.get_mut(id) {
            entry.parent = new_parent.cloned();
        }

        old_parent.as_ref() != new_parent || old_index != new_index
    }

    /// Rename an entry. Returns whether the entry exists.
    pub fn rename(&mut self, id: &TreeNodeId, name: impl Into<String>) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.name = name.into();
                true
            }
            None => {
                warn!(tree_node = %id, "Cannot rename missing tree node");
                false
            }
        }
    }
}
