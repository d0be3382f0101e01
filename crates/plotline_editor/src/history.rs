// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history built on whole-store snapshots.
//!
//! [`TrackedStore`] wraps an [`EntityStore`] and records the snapshot taken
//! before every mutating call. Pausing the history lets an interactive
//! gesture (a node drag, say) apply many mutations while the state from
//! before the gesture stays the single undo target.

use plotline_graph::{
    EdgeId, EdgeUpdate, EntityStore, GraphId, NodeId, NodeType, PinDirection, PinId, PinUpdate, Position,
    StoreSnapshot,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;

/// Maximum undo history depth
pub const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// History statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Entries in the undo stack
    pub undo_count: usize,
    /// Entries in the redo stack
    pub redo_count: usize,
    /// Maximum history depth
    pub max_depth: usize,
    /// Whether recording is paused
    pub paused: bool,
}

/// Bounded past/future stacks of states
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    future: VecDeque<T>,
    max_depth: usize,
    paused: bool,
}

impl<T> History<T> {
    /// Create a new history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            max_depth,
            paused: false,
        }
    }

    /// Record the state a mutation is leaving.
    ///
    /// Returns `false` without recording while paused. A recorded entry
    /// clears the redo stack and evicts the oldest entry past capacity.
    pub fn record(&mut self, prior: T) -> bool {
        if self.paused {
            return false;
        }

        self.future.clear();
        self.past.push_back(prior);

        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
        true
    }

    /// Step back, trading `current` for the most recent past state
    pub fn undo(&mut self, current: T) -> Result<T> {
        let previous = self.past.pop_back().ok_or(HistoryError::NothingToUndo)?;
        self.future.push_back(current);
        Ok(previous)
    }

    /// Step forward, trading `current` for the most recently undone state
    pub fn redo(&mut self, current: T) -> Result<T> {
        let next = self.future.pop_back().ok_or(HistoryError::NothingToRedo)?;
        self.past.push_back(current);
        Ok(next)
    }

    /// Stop recording
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume recording
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether recording is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Get undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Get redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Maximum depth
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.past.len(),
            redo_count: self.future.len(),
            max_depth: self.max_depth,
            paused: self.paused,
        }
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity store whose mutations are recorded for undo/redo
#[derive(Debug, Clone, Default)]
pub struct TrackedStore {
    store: EntityStore,
    history: History<StoreSnapshot>,
}

impl TrackedStore {
    /// Create an empty tracked store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom history depth
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            store: EntityStore::new(),
            history: History::with_max_depth(limit),
        }
    }

    /// The wrapped store
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Current entity state
    pub fn snapshot(&self) -> &StoreSnapshot {
        self.store.snapshot()
    }

    /// The history stacks
    pub fn history(&self) -> &History<StoreSnapshot> {
        &self.history
    }

    /// Run a mutation, recording the prior snapshot if anything changed
    fn track<R>(&mut self, mutate: impl FnOnce(&mut EntityStore) -> R) -> R {
        if self.history.is_paused() {
            return mutate(&mut self.store);
        }

        let before = self.store.snapshot().clone();
        let result = mutate(&mut self.store);
        if self.store.snapshot() != &before {
            self.history.record(before);
        }
        result
    }

    /// Undo the last recorded mutation
    pub fn undo(&mut self) -> Result<()> {
        if !self.history.can_undo() {
            return Err(HistoryError::NothingToUndo);
        }
        let current = self.store.snapshot().clone();
        let previous = self.history.undo(current)?;
        self.store.replace(previous);
        debug!(undo_depth = self.history.undo_depth(), "Undo");
        Ok(())
    }

    /// Redo the last undone mutation
    pub fn redo(&mut self) -> Result<()> {
        if !self.history.can_redo() {
            return Err(HistoryError::NothingToRedo);
        }
        let current = self.store.snapshot().clone();
        let next = self.history.redo(current)?;
        self.store.replace(next);
        debug!(redo_depth = self.history.redo_depth(), "Redo");
        Ok(())
    }

    /// Suspend recording, e.g. for the duration of a drag
    pub fn pause(&mut self) {
        self.history.pause();
    }

    /// Resume recording
    pub fn resume(&mut self) {
        self.history.resume();
    }

    /// Drop all undo/redo entries
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Replace the whole store state and start a fresh history
    pub fn hydrate(&mut self, snapshot: StoreSnapshot, active_graph: Option<GraphId>) {
        self.store.hydrate(snapshot, active_graph);
        self.history.clear();
    }

    /// Graph new nodes fall back to
    pub fn active_graph(&self) -> Option<&GraphId> {
        self.store.active_graph()
    }

    /// Set the active graph. Navigation is not recorded.
    pub fn set_active_graph(&mut self, graph_id: GraphId) {
        self.store.set_active_graph(graph_id);
    }

    /// See [`EntityStore::create_graph`]
    pub fn create_graph(&mut self, name: impl Into<String>) -> GraphId {
        let name = name.into();
        self.track(|s| s.create_graph(name))
    }

    /// See [`EntityStore::create_node`]
    pub fn create_node(&mut self, kind: NodeType, position: Position, graph_id: Option<&GraphId>) -> NodeId {
        self.track(|s| s.create_node(kind, position, graph_id))
    }

    /// See [`EntityStore::delete_nodes`]
    pub fn delete_nodes(&mut self, node_ids: &[NodeId]) {
        self.track(|s| s.delete_nodes(node_ids));
    }

    /// See [`EntityStore::move_node`]
    pub fn move_node(&mut self, node_id: &NodeId, position: Position) {
        self.track(|s| s.move_node(node_id, position));
    }

    /// See [`EntityStore::update_node_data`]
    pub fn update_node_data(&mut self, node_id: &NodeId, patch: &Value) -> bool {
        self.track(|s| s.update_node_data(node_id, patch))
    }

    /// See [`EntityStore::add_pin`]
    pub fn add_pin(&mut self, node_id: &NodeId, direction: PinDirection, name: Option<String>) -> PinId {
        self.track(|s| s.add_pin(node_id, direction, name))
    }

    /// See [`EntityStore::remove_pin`]
    pub fn remove_pin(&mut self, pin_id: &PinId) {
        self.track(|s| s.remove_pin(pin_id));
    }

    /// See [`EntityStore::update_pin`]
    pub fn update_pin(&mut self, pin_id: &PinId, update: PinUpdate) {
        self.track(|s| s.update_pin(pin_id, update));
    }

    /// See [`EntityStore::create_edge`]
    pub fn create_edge(
        &mut self,
        from_pin_id: &PinId,
        to_pin_id: &PinId,
        label: Option<String>,
        color: Option<String>,
    ) -> EdgeId {
        self.track(|s| s.create_edge(from_pin_id, to_pin_id, label, color))
    }

    /// See [`EntityStore::delete_edges`]
    pub fn delete_edges(&mut self, edge_ids: &[EdgeId]) {
        self.track(|s| s.delete_edges(edge_ids));
    }

    /// See [`EntityStore::update_edge`]
    pub fn update_edge(&mut self, edge_id: &EdgeId, update: EdgeUpdate) {
        self.track(|s| s.update_edge(edge_id, update));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked() -> (TrackedStore, GraphId) {
        let mut store = TrackedStore::new();
        let graph_id = store.create_graph("Main");
        store.set_active_graph(graph_id.clone());
        store.clear_history();
        (store, graph_id)
    }

    #[test]
    fn test_history_basic() {
        let mut history: History<u32> = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());

        assert!(history.record(1));
        assert!(history.can_undo());

        assert_eq!(history.undo(2), Ok(1));
        assert!(history.can_redo());
        assert_eq!(history.redo(1), Ok(2));
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_history_limit_evicts_oldest() {
        let mut history: History<u32> = History::with_max_depth(3);
        for i in 0..5 {
            history.record(i);
        }
        assert_eq!(history.undo_depth(), 3);
        assert_eq!(history.undo(99), Ok(4));
        assert_eq!(history.undo(4), Ok(3));
        assert_eq!(history.undo(3), Ok(2));
        assert_eq!(history.undo(2), Err(HistoryError::NothingToUndo));
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history: History<u32> = History::new();
        history.record(1);
        history.undo(2).unwrap();
        assert_eq!(history.redo_depth(), 1);
        history.record(3);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_undo_redo_node_creation() {
        let (mut store, graph_id) = tracked();
        let before = store.snapshot().clone();

        let node_id = store.create_node(NodeType::Line, Position::new(10.0, 20.0), None);
        let after = store.snapshot().clone();
        assert_eq!(store.history().undo_depth(), 1);

        store.undo().unwrap();
        assert_eq!(store.snapshot(), &before);
        assert!(store.store().node(&node_id).is_none());
        assert!(store.store().graph(&graph_id).unwrap().node_ids.is_empty());

        store.redo().unwrap();
        assert_eq!(store.snapshot(), &after);
        assert!(store.store().node(&node_id).is_some());
    }

    #[test]
    fn test_undo_restores_cascaded_delete() {
        let (mut store, _) = tracked();
        let a = store.create_node(NodeType::Line, Position::default(), None);
        let b = store.create_node(NodeType::Line, Position::default(), None);
        let out = store.snapshot().node_pins(&a, PinDirection::Out).next().unwrap().id.clone();
        let inp = store.snapshot().node_pins(&b, PinDirection::In).next().unwrap().id.clone();
        let edge_id = store.create_edge(&out, &inp, Some("go".into()), None);
        let before = store.snapshot().clone();

        store.delete_nodes(&[a.clone()]);
        assert!(store.store().edge(&edge_id).is_none());

        store.undo().unwrap();
        assert_eq!(store.snapshot(), &before);
    }

    #[test]
    fn test_pause_coalesces_drag() {
        let (mut store, _) = tracked();
        let node_id = store.create_node(NodeType::Hub, Position::default(), None);
        let before_drag = store.snapshot().clone();
        let depth = store.history().undo_depth();

        store.pause();
        assert!(store.history().is_paused());
        for step in 1..=20 {
            store.move_node(&node_id, Position::new(step as f64, step as f64 * 2.0));
        }
        store.resume();

        assert_eq!(store.history().undo_depth(), depth);
        assert_eq!(store.store().node(&node_id).unwrap().position, Position::new(20.0, 40.0));

        // The state before the node was created is the undo target, not the drag
        store.undo().unwrap();
        assert!(store.store().node(&node_id).is_none());
        assert_ne!(store.snapshot(), &before_drag);
    }

    #[test]
    fn test_unchanged_store_records_nothing() {
        let (mut store, _) = tracked();
        store.move_node(&"missing".into(), Position::new(1.0, 1.0));
        store.delete_nodes(&["missing".into()]);
        assert!(!store.update_node_data(&"missing".into(), &serde_json::json!({"text": "x"})));
        assert!(!store.history().can_undo());
    }

    #[test]
    fn test_empty_stacks_error() {
        let (mut store, _) = tracked();
        assert_eq!(store.undo(), Err(HistoryError::NothingToUndo));
        assert_eq!(store.redo(), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn test_hydrate_clears_history() {
        let (mut store, graph_id) = tracked();
        store.create_node(NodeType::End, Position::default(), None);
        let snapshot = store.snapshot().clone();

        store.hydrate(snapshot, Some(graph_id));
        let stats = store.history().stats();
        assert_eq!(stats.undo_count, 0);
        assert_eq!(stats.redo_count, 0);
        assert_eq!(stats.max_depth, MAX_HISTORY);
    }

    #[test]
    fn test_history_limit_applies_to_store() {
        let mut store = TrackedStore::with_history_limit(2);
        let graph_id = store.create_graph("Main");
        store.set_active_graph(graph_id);
        for _ in 0..5 {
            store.create_node(NodeType::Line, Position::default(), None);
        }
        assert_eq!(store.history().undo_depth(), 2);
    }
}
