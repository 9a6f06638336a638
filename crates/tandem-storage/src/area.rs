//! Storage area trait and the in-memory implementation.
//!
//! A [`StorageArea`] is a flat map of string keys to string values, the
//! shape of a browser's `localStorage`/`sessionStorage`. The facade holds
//! two of them, one durable and one session-scoped. Implementations:
//!
//! - **In-memory** ([`MemoryArea`]): session storage, tests
//! - **File-backed** ([`FileArea`](crate::FileArea)): durable storage
//!
//! Calls are synchronous and complete immediately.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StorageError, StorageResult};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A key-value storage area.
///
/// Keys and values are arbitrary strings. Entries outlive the facade; their
/// lifetime is owned by the implementation.
pub trait StorageArea: Send + Sync {
    /// Read the text stored under `key`.
    ///
    /// Returns `None` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the area cannot be read.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if the area refuses or fails the write.
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the area fails the delete.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Delete every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the area fails the clear.
    fn clear(&self) -> StorageResult<()>;

    /// List every key currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the area cannot be read.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// In-memory storage area.
///
/// Entries live as long as the value does, which makes it the natural
/// session area.
#[derive(Debug, Default)]
pub struct MemoryArea {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryArea {
    /// Create a new empty area.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn len(&self) -> StorageResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.len())
    }

    /// Whether the area holds no entries.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl StorageArea for MemoryArea {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        data.remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        data.clear();
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.keys().cloned().collect())
    }
}
