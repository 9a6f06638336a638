//! Ready-made facades.

use std::path::Path;
use std::sync::Arc;

use tandem_storage::{FileArea, MemoryArea, ReactiveStorage};

use crate::mocks::FaultyArea;

/// File name used for the durable area by [`file_storage`].
pub const TEST_DURABLE_FILE: &str = "local.json";

/// A facade with both areas in memory.
#[must_use]
pub fn memory_storage() -> ReactiveStorage {
    ReactiveStorage::in_memory()
}

/// A facade whose durable area is a [`FileArea`] at `{dir}/local.json`.
///
/// Calling this twice with the same `dir` simulates a restart: the durable
/// entries survive while the session area starts empty.
///
/// # Panics
///
/// Panics if the durable file exists and cannot be loaded.
#[must_use]
pub fn file_storage(dir: &Path) -> ReactiveStorage {
    let durable = FileArea::open(dir.join(TEST_DURABLE_FILE))
        .expect("Failed to open durable storage area")
        .with_sync_on_write(false);
    ReactiveStorage::new(Arc::new(durable), Arc::new(MemoryArea::new()))
}

/// A facade over two [`FaultyArea`]s, returned alongside handles to them.
///
/// The tuple is `(storage, durable, session)`.
#[must_use]
pub fn faulty_storage() -> (ReactiveStorage, Arc<FaultyArea>, Arc<FaultyArea>) {
    let durable = Arc::new(FaultyArea::new());
    let session = Arc::new(FaultyArea::new());
    let storage = ReactiveStorage::new(durable.clone(), session.clone());
    (storage, durable, session)
}
