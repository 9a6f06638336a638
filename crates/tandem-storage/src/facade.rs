//! The reactive storage facade.
//!
//! [`ReactiveStorage`] routes every call to one of two injected
//! [`StorageArea`]s and returns the outcome as an [`AsyncSingle`]. Backend
//! failures never escape: reads degrade to "absent" and mutations report
//! `false`, with the underlying error logged at `warn`.
//!
//! # Example
//!
//! ```rust
//! use futures::StreamExt;
//! use serde_json::json;
//! use tandem_storage::{ReactiveStorage, StorageMode};
//!
//! # futures::executor::block_on(async {
//! let storage = ReactiveStorage::in_memory();
//!
//! assert_eq!(storage.set("count", &0, StorageMode::Local).next().await, Some(true));
//! assert_eq!(
//!     storage.get("count", StorageMode::Local).next().await,
//!     Some(Some(json!(0)))
//! );
//!
//! // `None` selects the default mode (session).
//! assert_eq!(storage.get("count", None).next().await, Some(None));
//! # });
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::area::{MemoryArea, StorageArea};
use crate::codec;
use crate::error::StorageResult;
use crate::mode::{ClearTarget, StorageMode};
use crate::single::{AsyncSingle, resolved};

/// Reactive facade over a durable and a session storage area.
#[derive(Clone)]
pub struct ReactiveStorage {
    durable: Arc<dyn StorageArea>,
    session: Arc<dyn StorageArea>,
    default_mode: StorageMode,
}

impl std::fmt::Debug for ReactiveStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveStorage")
            .field("default_mode", &self.default_mode)
            .finish_non_exhaustive()
    }
}

impl ReactiveStorage {
    /// Create a facade over the given durable and session areas.
    #[must_use]
    pub fn new(durable: Arc<dyn StorageArea>, session: Arc<dyn StorageArea>) -> Self {
        Self {
            durable,
            session,
            default_mode: StorageMode::default(),
        }
    }

    /// Create a facade where both areas live in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryArea::new()), Arc::new(MemoryArea::new()))
    }

    /// Set the mode used when an operation is given `None`.
    #[must_use]
    pub fn with_default_mode(mut self, mode: StorageMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// The mode used when an operation is given `None`.
    #[must_use]
    pub fn default_mode(&self) -> StorageMode {
        self.default_mode
    }

    /// The area backing `mode`.
    #[must_use]
    pub fn area(&self, mode: StorageMode) -> &dyn StorageArea {
        match mode {
            StorageMode::Local => self.durable.as_ref(),
            StorageMode::Session => self.session.as_ref(),
        }
    }

    fn resolve(&self, mode: impl Into<Option<StorageMode>>) -> StorageMode {
        mode.into().unwrap_or(self.default_mode)
    }

    /// Read and decode the value stored under `key`.
    ///
    /// Yields `None` if the key is absent or holds empty text. A read
    /// failure is logged and also yields `None`.
    pub fn get(
        &self,
        key: &str,
        mode: impl Into<Option<StorageMode>>,
    ) -> AsyncSingle<Option<Value>> {
        resolved(self.read_value(key, self.resolve(mode)))
    }

    /// Read the value stored under `key` as a `T`.
    ///
    /// Yields `None` if the key is absent or the decoded value does not
    /// deserialize into `T`.
    pub fn get_as<T: DeserializeOwned>(
        &self,
        key: &str,
        mode: impl Into<Option<StorageMode>>,
    ) -> AsyncSingle<Option<T>> {
        let mode = self.resolve(mode);
        let typed = self
            .read_value(key, mode)
            .and_then(|value| match serde_json::from_value(value) {
                Ok(typed) => Some(typed),
                Err(e) => {
                    warn!(key, %mode, error = %e, "Stored value does not match requested type");
                    None
                },
            });
        resolved(typed)
    }

    /// Encode `value` and store it under `key`.
    ///
    /// Yields `true` only if reading the key back returns exactly the
    /// encoded text. Encoding and write failures are logged and yield
    /// `false`.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        mode: impl Into<Option<StorageMode>>,
    ) -> AsyncSingle<bool> {
        let mode = self.resolve(mode);
        let encoded = match codec::encode_serializable(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(key, %mode, error = %e, "Value could not be encoded");
                return resolved(false);
            },
        };

        let area = self.area(mode);
        let stored = match area.write(key, &encoded).and_then(|()| area.read(key)) {
            Ok(read_back) => read_back.as_deref() == Some(encoded.as_str()),
            Err(e) => {
                warn!(key, %mode, error = %e, "Storage write failed");
                false
            },
        };
        debug!(key, %mode, stored, bytes = encoded.len(), "set");
        resolved(stored)
    }

    /// Delete `key` if present.
    ///
    /// Yields `true` if the key is absent afterwards, which includes keys
    /// that never existed.
    pub fn remove(&self, key: &str, mode: impl Into<Option<StorageMode>>) -> AsyncSingle<bool> {
        let mode = self.resolve(mode);
        let removed = match remove_from(self.area(mode), key) {
            Ok(removed) => removed,
            Err(e) => {
                warn!(key, %mode, error = %e, "Storage remove failed");
                false
            },
        };
        debug!(key, %mode, removed, "remove");
        resolved(removed)
    }

    /// Empty the targeted areas.
    ///
    /// With [`ClearTarget::All`] both areas are cleared, and the result is
    /// `true` only if both succeed.
    pub fn clear(&self, target: ClearTarget) -> AsyncSingle<bool> {
        let cleared = match target {
            ClearTarget::Local => self.clear_area(StorageMode::Local),
            ClearTarget::Session => self.clear_area(StorageMode::Session),
            ClearTarget::All => {
                let session = self.clear_area(StorageMode::Session);
                let local = self.clear_area(StorageMode::Local);
                session && local
            },
        };
        debug!(%target, cleared, "clear");
        resolved(cleared)
    }

    /// List the keys held by the area backing `mode`.
    ///
    /// A read failure is logged and yields an empty list.
    pub fn keys(&self, mode: impl Into<Option<StorageMode>>) -> AsyncSingle<Vec<String>> {
        let mode = self.resolve(mode);
        let keys = self.area(mode).keys().unwrap_or_else(|e| {
            warn!(%mode, error = %e, "Storage key listing failed");
            Vec::new()
        });
        resolved(keys)
    }

    fn read_value(&self, key: &str, mode: StorageMode) -> Option<Value> {
        let text = match self.area(mode).read(key) {
            Ok(text) => text,
            Err(e) => {
                warn!(key, %mode, error = %e, "Storage read failed; treating key as absent");
                None
            },
        };

        let value = text
            .filter(|text| !text.is_empty())
            .map(|text| codec::decode(&text));
        debug!(key, %mode, found = value.is_some(), "get");
        value
    }

    fn clear_area(&self, mode: StorageMode) -> bool {
        match self.area(mode).clear() {
            Ok(()) => true,
            Err(e) => {
                warn!(%mode, error = %e, "Storage clear failed");
                false
            },
        }
    }
}

fn remove_from(area: &dyn StorageArea, key: &str) -> StorageResult<bool> {
    if area.read(key)?.is_some() {
        area.remove(key)?;
    }
    Ok(area.read(key)?.is_none())
}
