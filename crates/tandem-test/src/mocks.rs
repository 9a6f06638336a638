//! Mock storage areas for testing.

use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

use tandem_storage::{MemoryArea, StorageArea, StorageError, StorageResult};

/// A [`StorageArea`] operation, used to select which calls fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaOp {
    /// [`StorageArea::read`].
    Read,
    /// [`StorageArea::write`].
    Write,
    /// [`StorageArea::remove`].
    Remove,
    /// [`StorageArea::clear`].
    Clear,
    /// [`StorageArea::keys`].
    Keys,
}

impl fmt::Display for AreaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Remove => "remove",
            Self::Clear => "clear",
            Self::Keys => "keys",
        };
        f.write_str(name)
    }
}

/// In-memory storage area with injectable faults.
///
/// Failing operations return [`StorageError::Unavailable`] without touching
/// the stored entries. With corrupt reads enabled, every read of a present
/// key returns text that differs from what was written.
///
/// Uses `std::sync::Mutex` so faults can be toggled from sync or async
/// tests through a shared `Arc`.
#[derive(Debug, Default)]
pub struct FaultyArea {
    inner: MemoryArea,
    failing: Mutex<HashSet<AreaOp>>,
    corrupt_reads: Mutex<bool>,
    calls: Mutex<Vec<(AreaOp, Option<String>)>>,
}

impl FaultyArea {
    /// Create an area with no faults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `op` fail from the start.
    #[must_use]
    pub fn with_failure(self, op: AreaOp) -> Self {
        self.fail(op);
        self
    }

    /// Make every read of a present key return mangled text.
    #[must_use]
    pub fn with_corrupt_reads(self) -> Self {
        self.set_corrupt_reads(true);
        self
    }

    /// Make `op` fail from now on.
    pub fn fail(&self, op: AreaOp) {
        if let Ok(mut guard) = self.failing.lock() {
            guard.insert(op);
        }
    }

    /// Stop failing `op`.
    pub fn heal(&self, op: AreaOp) {
        if let Ok(mut guard) = self.failing.lock() {
            guard.remove(&op);
        }
    }

    /// Toggle corrupt reads.
    pub fn set_corrupt_reads(&self, enabled: bool) {
        if let Ok(mut guard) = self.corrupt_reads.lock() {
            *guard = enabled;
        }
    }

    /// Store an entry directly, bypassing fault injection.
    ///
    /// # Panics
    ///
    /// Panics if the underlying memory area is poisoned.
    pub fn seed(&self, key: &str, value: &str) {
        self.inner
            .write(key, value)
            .expect("Failed to seed storage area");
    }

    /// Read an entry directly, bypassing fault injection.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.read(key).ok().flatten()
    }

    /// Every call made so far, with the key where the operation takes one.
    #[must_use]
    pub fn calls(&self) -> Vec<(AreaOp, Option<String>)> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Number of calls made for `op`.
    #[must_use]
    pub fn call_count(&self, op: AreaOp) -> usize {
        self.calls
            .lock()
            .map(|g| g.iter().filter(|(called, _)| *called == op).count())
            .unwrap_or_default()
    }

    fn enter(&self, op: AreaOp, key: Option<&str>) -> StorageResult<()> {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push((op, key.map(str::to_owned)));
        }
        let failing = self
            .failing
            .lock()
            .map(|g| g.contains(&op))
            .unwrap_or_default();
        if failing {
            return Err(StorageError::Unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }
}

impl StorageArea for FaultyArea {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        self.enter(AreaOp::Read, Some(key))?;
        let value = self.inner.read(key)?;
        let corrupt = self.corrupt_reads.lock().map(|g| *g).unwrap_or_default();
        if corrupt {
            return Ok(value.map(|text| format!("{text}#corrupt")));
        }
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.enter(AreaOp::Write, Some(key))?;
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.enter(AreaOp::Remove, Some(key))?;
        self.inner.remove(key)
    }

    fn clear(&self) -> StorageResult<()> {
        self.enter(AreaOp::Clear, None)?;
        self.inner.clear()
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.enter(AreaOp::Keys, None)?;
        self.inner.keys()
    }
}
