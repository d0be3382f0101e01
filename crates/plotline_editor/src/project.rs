// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project metadata, characters and the hierarchy tree.
//!
//! Every change made through [`Project`] refreshes `updated_at`.

use crate::hierarchy::{DuplicateTreeNode, Hierarchy, TreeNode, TreeNodeId, TreeNodeType};
use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use plotline_graph::{string_id, GraphId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Current project document schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Name used when a project is created without one
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

string_id!(
    /// Unique identifier for a project
    ProjectId
);

string_id!(
    /// Unique identifier for a character
    CharacterId
);

/// A speaking character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Character id, referenced by line `speakerId`
    pub id: CharacterId,
    /// Display name
    pub name: String,
}

/// Current time as an RFC 3339 UTC timestamp with milliseconds
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Project-level state that lives beside the entity store
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Project id
    pub id: ProjectId,
    /// Project name
    pub name: String,
    /// Schema version of the document this project was loaded from
    pub schema_version: u32,
    /// Creation timestamp
    pub created_at: String,
    /// Last modification timestamp
    pub updated_at: String,
    characters: IndexMap<CharacterId, Character>,
    hierarchy: Hierarchy,
}

impl Project {
    /// Create a new empty project
    pub fn new(name: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: now.clone(),
            updated_at: now,
            characters: IndexMap::new(),
            hierarchy: Hierarchy::new(),
        }
    }

    /// Assemble a project from loaded parts without touching timestamps
    pub fn from_parts(
        id: ProjectId,
        name: String,
        created_at: String,
        updated_at: String,
        characters: Vec<Character>,
        hierarchy: Hierarchy,
    ) -> Self {
        Self {
            id,
            name,
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at,
            updated_at,
            characters: characters.into_iter().map(|c| (c.id.clone(), c)).collect(),
            hierarchy,
        }
    }

    fn touch(&mut self) {
        self.updated_at = timestamp_now();
    }

    /// Rename the project
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Characters in insertion order
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Get a character by id
    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }

    /// Add a character
    pub fn add_character(&mut self, name: impl Into<String>) -> CharacterId {
        let character = Character {
            id: CharacterId::new(),
            name: name.into(),
        };
        let id = character.id.clone();
        self.characters.insert(id.clone(), character);
        self.touch();
        debug!(character = %id, "Added character");
        id
    }

    /// Remove a character.
    ///
    /// Lines naming it as speaker keep the now dangling id.
    pub fn remove_character(&mut self, id: &CharacterId) -> bool {
        if self.characters.shift_remove(id).is_none() {
            return false;
        }
        self.touch();
        true
    }

    /// Rename a character
    pub fn update_character(&mut self, id: &CharacterId, name: impl Into<String>) -> bool {
        let Some(character) = self.characters.get_mut(id) else {
            warn!(character = %id, "Cannot update missing character");
            return false;
        };
        character.name = name.into();
        self.touch();
        true
    }

    /// The hierarchy tree
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Replace the hierarchy with a nested tree
    pub fn set_hierarchy(&mut self, roots: &[TreeNode]) -> Result<(), DuplicateTreeNode> {
        self.hierarchy = Hierarchy::from_tree(roots)?;
        self.touch();
        Ok(())
    }

    /// See [`Hierarchy::add`]
    pub fn add_tree_node(
        &mut self,
        parent: Option<&TreeNodeId>,
        kind: TreeNodeType,
        name: impl Into<String>,
        graph_id: Option<GraphId>,
    ) -> TreeNodeId {
        let id = self.hierarchy.add(parent, kind, name, graph_id);
        if self.hierarchy.get(&id).is_some() {
            self.touch();
        }
        id
    }

    /// See [`Hierarchy::remove`]
    pub fn remove_tree_node(&mut self, id: &TreeNodeId) {
        if self.hierarchy.remove(id) {
            self.touch();
        }
    }

    /// See [`Hierarchy::move_to`]
    pub fn move_tree_node(&mut self, id: &TreeNodeId, new_parent: Option<&TreeNodeId>, index: usize) {
        if self.hierarchy.move_to(id, new_parent, index) {
            self.touch();
        }
    }

    /// See [`Hierarchy::rename`]
    pub fn rename_tree_node(&mut self, id: &TreeNodeId, name: impl Into<String>) {
        if self.hierarchy.rename(id, name) {
            self.touch();
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stale(project: &mut Project) {
        project.updated_at = "2000-01-01T00:00:00.000Z".to_string();
    }

    #[test]
    fn test_new_project() {
        let project = Project::default();
        assert_eq!(project.name, "Untitled Project");
        assert_eq!(project.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(project.created_at, project.updated_at);
        assert!(project.created_at.ends_with('Z'));
        assert_eq!(project.characters().count(), 0);
        assert!(project.hierarchy().is_empty());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp_now();
        // 2024-01-01T00:00:00.000Z
        assert_eq!(ts.len(), 24);
        assert_eq!(&ts[19..20], ".");
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_characters() {
        let mut project = Project::new("Story");
        stale(&mut project);
        let alice = project.add_character("Alice");
        assert_ne!(project.updated_at, "2000-01-01T00:00:00.000Z");

        assert!(project.update_character(&alice, "Alicia"));
        assert_eq!(project.character(&alice).unwrap().name, "Alicia");

        stale(&mut project);
        assert!(!project.update_character(&"missing".into(), "x"));
        assert_eq!(project.updated_at, "2000-01-01T00:00:00.000Z");

        assert!(project.remove_character(&alice));
        assert!(project.character(&alice).is_none());
        assert!(!project.remove_character(&alice));
    }

    #[test]
    fn test_tree_mutations_refresh_timestamp() {
        let mut project = Project::new("Story");
        stale(&mut project);
        let folder = project.add_tree_node(None, TreeNodeType::Folder, "Act 1", None);
        assert_ne!(project.updated_at, "2000-01-01T00:00:00.000Z");

        stale(&mut project);
        project.rename_tree_node(&folder, "Act One");
        assert_ne!(project.updated_at, "2000-01-01T00:00:00.000Z");
        assert_eq!(project.hierarchy().get(&folder).unwrap().name, "Act One");

        let child = project.add_tree_node(Some(&folder), TreeNodeType::Chapter, "Ch", None);
        stale(&mut project);
        project.move_tree_node(&folder, Some(&child), 0);
        assert_eq!(project.updated_at, "2000-01-01T00:00:00.000Z");

        project.remove_tree_node(&folder);
        assert!(project.hierarchy().is_empty());
        assert_ne!(project.updated_at, "2000-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_rename_project() {
        let mut project = Project::new("Draft");
        stale(&mut project);
        project.rename("Final");
        assert_eq!(project.name, "Final");
        assert_ne!(project.updated_at, "2000-01-01T00:00:00.000Z");
    }
}
