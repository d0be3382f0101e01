// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor state management.
//!
//! One [`EditorState`] exists per open project. It owns the tracked entity
//! store with its undo history and the project layer beside it.

use crate::export::{export_project, ExportError};
use crate::hierarchy::TreeNodeType;
use crate::history::{TrackedStore, MAX_HISTORY};
use crate::import::{import_project, ImportError};
use crate::project::Project;
use plotline_graph::{validate_graph, validate_project, GraphId, ValidationWarning};
use std::collections::BTreeMap;

/// Name of the graph every new project starts with
pub const MAIN_GRAPH_NAME: &str = "Main";

/// Main editor state
#[derive(Debug, Clone)]
pub struct EditorState {
    tracked: TrackedStore,
    project: Project,
}

impl EditorState {
    /// Create a project with a single active "Main" graph
    pub fn new(project_name: impl Into<String>) -> Self {
        Self::with_history_limit(project_name, MAX_HISTORY)
    }

    /// Like [`EditorState::new`] with a custom undo capacity
    pub fn with_history_limit(project_name: impl Into<String>, history_limit: usize) -> Self {
        let mut tracked = TrackedStore::with_history_limit(history_limit);
        let main = tracked.create_graph(MAIN_GRAPH_NAME);
        tracked.set_active_graph(main.clone());
        tracked.clear_history();

        let mut project = Project::new(project_name);
        project.add_tree_node(None, TreeNodeType::GraphRef, MAIN_GRAPH_NAME, Some(main));

        tracing::info!(project = %project.id, "Created new project");
        Self { tracked, project }
    }

    /// The tracked store
    pub fn tracked(&self) -> &TrackedStore {
        &self.tracked
    }

    /// The tracked store, for mutation
    pub fn tracked_mut(&mut self) -> &mut TrackedStore {
        &mut self.tracked
    }

    /// Project metadata, characters and hierarchy
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Project layer, for mutation
    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    /// Graph new nodes are placed in
    pub fn active_graph(&self) -> Option<&GraphId> {
        self.tracked.active_graph()
    }

    /// Canonical JSON of the whole project
    pub fn export_project(&self) -> Result<String, ExportError> {
        export_project(self.tracked.snapshot(), &self.project)
    }

    /// Replace the whole project from a document.
    ///
    /// On error nothing changes. On success the undo history starts empty.
    pub fn import_project(&mut self, json: &str) -> Result<(), ImportError> {
        let imported = import_project(json)?;
        self.tracked.hydrate(imported.snapshot, imported.active_graph);
        self.project = imported.project;
        Ok(())
    }

    /// Structural warnings for one graph
    pub fn validate_graph(&self, graph_id: &GraphId) -> Vec<ValidationWarning> {
        validate_graph(self.tracked.snapshot(), graph_id)
    }

    /// Structural warnings for every graph
    pub fn validate_all(&self) -> BTreeMap<GraphId, Vec<ValidationWarning>> {
        validate_project(self.tracked.snapshot())
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(crate::project::DEFAULT_PROJECT_NAME)
    }
}
