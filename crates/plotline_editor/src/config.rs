// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration stored as RON.

use crate::history::MAX_HISTORY;
use crate::persistence::PROJECT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Conventional configuration file name
pub const CONFIG_FILE_NAME: &str = "plotline.ron";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be rendered
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer application
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}

/// Editor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Format version
    pub version: u32,
    /// Undo history capacity
    pub history_limit: usize,
    /// Root directory of the file-backed project store
    pub storage_dir: PathBuf,
    /// Key the project is saved under
    pub storage_key: String,
    /// Default log filter, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            history_limit: MAX_HISTORY,
            storage_dir: PathBuf::from(".plotline"),
            storage_key: PROJECT_STORAGE_KEY.to_string(),
            log_filter: "plotline_editor=info,plotline_graph=info".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EditorConfig = ron::from_str(&content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().struct_names(true);
        let content = ron::ser::to_string_pretty(self, pretty)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}
