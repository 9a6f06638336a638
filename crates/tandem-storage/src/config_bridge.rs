//! Building a facade from a loaded `tandem_config::Config`.

use std::sync::Arc;

use tandem_config::Config;
use tracing::info;

use crate::area::MemoryArea;
use crate::error::{StorageError, StorageResult};
use crate::facade::ReactiveStorage;
use crate::file::FileArea;
use crate::mode::StorageMode;

impl ReactiveStorage {
    /// Build a facade from the `[storage]` section of `config`.
    ///
    /// The durable area is a [`FileArea`] at the configured (or platform
    /// default) path. The session area is a fresh [`MemoryArea`].
    ///
    /// # Errors
    ///
    /// Returns an error if the durable path cannot be resolved, the durable
    /// file cannot be loaded, or `default_mode` is not a known mode.
    pub fn from_config(config: &Config) -> StorageResult<Self> {
        let section = &config.storage;

        let default_mode: StorageMode = section
            .default_mode
            .parse()
            .map_err(StorageError::Rejected)?;
        let path = section
            .resolve_durable_path()
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        let durable = FileArea::open(&path)?.with_sync_on_write(section.sync_on_write);
        info!(
            path = %path.display(),
            %default_mode,
            sync_on_write = section.sync_on_write,
            "Storage facade configured"
        );

        Ok(Self::new(Arc::new(durable), Arc::new(MemoryArea::new()))
            .with_default_mode(default_mode))
    }
}
