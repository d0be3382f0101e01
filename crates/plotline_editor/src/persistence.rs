// SPDX-License-Identifier: MIT OR Apache-2.0
//! Async key-value persistence of the canonical project document.

use crate::export::ExportError;
use crate::import::ImportError;
use crate::state::EditorState;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Key the project document is stored under by default
pub const PROJECT_STORAGE_KEY: &str = "project-store";

/// Storage backend errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Persistence errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The backend failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The stored document could not be loaded
    #[error(transparent)]
    Import(#[from] ImportError),

    /// The project could not be rendered
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Generic async string key-value store
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read a value; `None` when the key is absent
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value; absent keys are not an error
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.write().remove(key);
        Ok(())
    }
}

/// Filesystem backend storing one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a backend rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::Backend(format!("invalid storage key {key:?}")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, value).await?;
        debug!(path = %path.display(), bytes = value.len(), "Wrote storage item");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Saves and restores an [`EditorState`] through a key-value backend
pub struct ProjectPersistence<S: KeyValueStorage> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> ProjectPersistence<S> {
    /// Persist under [`PROJECT_STORAGE_KEY`]
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, PROJECT_STORAGE_KEY)
    }

    /// Persist under a custom key
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Storage key in use
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store the canonical export of `state`
    pub async fn save(&self, state: &EditorState) -> Result<(), PersistenceError> {
        let text = state.export_project()?;
        self.storage.set_item(&self.key, &text).await?;
        info!(key = %self.key, "Saved project");
        Ok(())
    }

    /// Load the stored project into `state`.
    ///
    /// Returns `false` when nothing is stored. On error `state` is untouched.
    pub async fn load(&self, state: &mut EditorState) -> Result<bool, PersistenceError> {
        let Some(text) = self.storage.get_item(&self.key).await? else {
            return Ok(false);
        };
        state.import_project(&text)?;
        info!(key = %self.key, "Loaded project");
        Ok(true)
    }

    /// Delete the stored project
    pub async fn clear(&self) -> Result<(), PersistenceError> {
        self.storage.remove_item(&self.key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotline_graph::{NodeType, Position};

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("a").await.unwrap(), None);

        storage.set_item("a", "1").await.unwrap();
        assert_eq!(storage.get_item("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(storage.len(), 1);

        storage.remove_item("a").await.unwrap();
        storage.remove_item("a").await.unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("store"));

        assert_eq!(storage.get_item("project").await.unwrap(), None);
        storage.set_item("project", "{}").await.unwrap();
        assert!(dir.path().join("store/project.json").exists());
        assert_eq!(storage.get_item("project").await.unwrap().as_deref(), Some("{}"));

        storage.remove_item("project").await.unwrap();
        assert_eq!(storage.get_item("project").await.unwrap(), None);
        storage.remove_item("project").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(storage.set_item(key, "x").await, Err(StorageError::Backend(_))));
        }
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let persistence = ProjectPersistence::new(MemoryStorage::new());

        let mut state = EditorState::new("Saved");
        state.tracked_mut().create_node(NodeType::Line, Position::new(5.0, 5.0), None);
        persistence.save(&state).await.unwrap();
        let saved = state.export_project().unwrap();

        let mut restored = EditorState::new("Other");
        assert!(persistence.load(&mut restored).await.unwrap());
        assert_eq!(restored.export_project().unwrap(), saved);
        assert!(!restored.tracked().history().can_undo());
    }

    #[tokio::test]
    async fn test_load_missing_and_corrupt() {
        let storage = MemoryStorage::new();
        let persistence = ProjectPersistence::with_key(storage.clone(), "slot");
        let mut state = EditorState::new("Keep");
        let before = state.export_project().unwrap();

        assert!(!persistence.load(&mut state).await.unwrap());

        storage.set_item("slot", "{broken").await.unwrap();
        let err = persistence.load(&mut state).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Import(ImportError::Parse(_))));
        assert_eq!(state.export_project().unwrap(), before);

        persistence.clear().await.unwrap();
        assert!(storage.is_empty());
    }
}
