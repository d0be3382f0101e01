// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plotline editor core.
//!
//! Everything that sits on top of a single entity store:
//! - Undo/redo history with gesture coalescing
//! - Project metadata, characters and the hierarchy tree
//! - Canonical export and versioned import
//! - Async key-value persistence
//!
//! ## Architecture
//!
//! An [`EditorState`] owns one tracked store and its project. The store
//! itself lives in `plotline_graph`; this crate never mutates it except
//! through [`TrackedStore`], so every change is undoable.

pub mod config;
pub mod export;
pub mod hierarchy;
pub mod history;
pub mod import;
pub mod migrations;
pub mod persistence;
pub mod project;
pub mod state;

pub use config::{ConfigError, EditorConfig};
pub use export::{export_project, ExportError, ProjectExport};
pub use hierarchy::{Hierarchy, TreeNode, TreeNodeId, TreeNodeType};
pub use history::{History, HistoryError, HistoryStats, TrackedStore};
pub use import::{import_project, ImportError, ImportedProject};
pub use persistence::{FileStorage, KeyValueStorage, MemoryStorage, PersistenceError, ProjectPersistence, StorageError};
pub use project::{Character, CharacterId, Project, ProjectId, CURRENT_SCHEMA_VERSION};
pub use state::EditorState;
