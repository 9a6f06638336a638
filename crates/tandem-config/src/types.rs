//! Configuration struct definitions.
//!
//! Every struct implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a bare `[section]` header produces a working
//! configuration. Mode and format fields stay plain strings here; they are
//! checked by [`validate`](crate::validate) and converted to domain types at
//! the integration boundary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// File name of the durable area inside the platform data directory.
pub const DURABLE_FILE_NAME: &str = "local.json";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage areas and default mode.
    pub storage: StorageSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Area used when an operation does not name one (`local` or `session`).
    pub default_mode: String,
    /// Location of the durable area. `None` selects the platform data dir.
    pub durable_path: Option<PathBuf>,
    /// Whether the durable area is fsynced before each atomic replace.
    pub sync_on_write: bool,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            default_mode: "session".to_owned(),
            durable_path: None,
            sync_on_write: true,
        }
    }
}

impl StorageSection {
    /// The durable area's file path, falling back to
    /// `{data_dir}/tandem/local.json`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoDataDir`] if no path is configured and the
    /// platform data directory cannot be determined.
    pub fn resolve_durable_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.durable_path {
            return Ok(path.clone());
        }
        directories::ProjectDirs::from("", "", "tandem")
            .map(|dirs| dirs.data_dir().join(DURABLE_FILE_NAME))
            .ok_or(ConfigError::NoDataDir)
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level filter (e.g. `"info"`, `"debug"`).
    pub level: String,
    /// Output format: `pretty`, `compact`, `json`, or `full`.
    pub format: String,
    /// Per-target directive overrides (e.g. `tandem_storage=debug`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}
