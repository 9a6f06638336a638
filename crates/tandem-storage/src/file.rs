//! File-backed durable storage area.
//!
//! The whole area is one JSON object mapping keys to stored text. Nothing
//! is cached: reads load the document under a shared advisory lock on a
//! `.lk` sibling file, and mutations hold the exclusive lock for the whole
//! read-modify-write. The new document goes to a temp file in the same
//! directory, which is then renamed over the old one. Any number of
//! `FileArea`s, in this process or others, may share one path.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::area::StorageArea;
use crate::error::{StorageError, StorageResult};

type Entries = BTreeMap<String, String>;

/// Durable storage area persisted to a JSON file.
#[derive(Debug)]
pub struct FileArea {
    path: PathBuf,
    sync_on_write: bool,
}

enum LockMode {
    Shared,
    Exclusive,
}

impl FileArea {
    /// Open the area stored at `path`.
    ///
    /// A missing or empty file yields an empty area; the file is created on
    /// the first mutation.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Persistence`] if the file exists but cannot
    /// be read or is not a JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let area = Self {
            path: path.as_ref().to_path_buf(),
            sync_on_write: true,
        };
        let entries = area.load()?;
        debug!(path = %area.path.display(), entries = entries.len(), "Opened durable storage area");
        Ok(area)
    }

    /// Whether to fsync the document before renaming it into place.
    #[must_use]
    pub fn with_sync_on_write(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the document under a shared lock.
    fn load(&self) -> StorageResult<Entries> {
        let _lock_guard = acquire_lock_file(&self.path, LockMode::Shared)?;
        self.read_document()
    }

    /// Apply `f` to the current document and persist the result.
    ///
    /// The exclusive lock is held from the read to the rename, so
    /// concurrent writers on the same path never lose each other's updates.
    /// `f` returns `false` when nothing changed, which skips the write.
    fn mutate<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut Entries) -> bool,
    {
        let parent = parent_dir(&self.path);
        std::fs::create_dir_all(parent)
            .map_err(|e| self.error(format!("failed to create parent directory: {e}")))?;

        let _lock_guard = acquire_lock_file(&self.path, LockMode::Exclusive)?;

        let mut entries = self.read_document()?;
        if !f(&mut entries) {
            return Ok(());
        }
        self.persist(parent, &entries)
    }

    /// Read and parse the document. The caller holds the lock.
    fn read_document(&self) -> StorageResult<Entries> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                return Ok(Entries::new());
            },
            Err(e) => return Err(self.error(format!("failed to read storage file: {e}"))),
        };

        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| self.error(format!("failed to parse storage file: {e}")))
    }

    /// Atomically replace the document. The caller holds the exclusive lock.
    fn persist(&self, parent: &Path, entries: &Entries) -> StorageResult<()> {
        let body = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| self.error(format!("failed to create temp file: {e}")))?;
        tmp.write_all(body.as_bytes())
            .map_err(|e| self.error(format!("failed to write temp file: {e}")))?;
        if self.sync_on_write {
            tmp.as_file()
                .sync_all()
                .map_err(|e| self.error(format!("failed to sync temp file: {e}")))?;
        }
        tmp.persist(&self.path)
            .map_err(|e| self.error(format!("failed to replace storage file: {e}")))?;

        debug!(
            path = %self.path.display(),
            entries = entries.len(),
            "Persisted durable storage area"
        );
        Ok(())
    }

    fn error(&self, message: String) -> StorageError {
        StorageError::Persistence {
            path: self.path.clone(),
            message,
        }
    }
}

impl StorageArea for FileArea {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.mutate(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
            true
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn clear(&self) -> StorageResult<()> {
        self.mutate(|entries| {
            let changed = !entries.is_empty();
            entries.clear();
            changed
        })
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Acquire an advisory lock on the `.lk` sibling of `path`.
///
/// Shared mode never creates the lock file; if it does not exist there is
/// no writer to coordinate with and `None` is returned. Exclusive mode
/// creates it as needed. The lock is released when the file is dropped.
fn acquire_lock_file(path: &Path, mode: LockMode) -> StorageResult<Option<std::fs::File>> {
    let lock_path = path.with_extension("lk");
    let persistence = |message: String| StorageError::Persistence {
        path: path.to_path_buf(),
        message,
    };

    match mode {
        LockMode::Shared => match std::fs::OpenOptions::new().read(true).open(&lock_path) {
            Ok(lock_file) => {
                lock_file
                    .lock_shared()
                    .map_err(|e| persistence(format!("failed to acquire shared lock: {e}")))?;
                Ok(Some(lock_file))
            },
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(None)
            },
            Err(e) => Err(persistence(format!("failed to open lock file: {e}"))),
        },
        LockMode::Exclusive => {
            let lock_file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .read(true)
                .open(&lock_path)
                .map_err(|e| persistence(format!("failed to open lock file: {e}")))?;
            lock_file
                .lock_exclusive()
                .map_err(|e| persistence(format!("failed to acquire exclusive lock: {e}")))?;
            Ok(Some(lock_file))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("local.json")
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let area = FileArea::open(area_path(&dir)).unwrap();
        assert!(area.keys().unwrap().is_empty());
        assert!(!area_path(&dir).exists());
    }

    #[test]
    fn test_write_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let area = FileArea::open(area_path(&dir)).unwrap();
        area.write("count", r#"{"data":0}"#).unwrap();
        drop(area);

        let reopened = FileArea::open(area_path(&dir)).unwrap();
        assert_eq!(
            reopened.read("count").unwrap().as_deref(),
            Some(r#"{"data":0}"#)
        );
    }

    #[test]
    fn test_remove_and_clear_persist() {
        let dir = tempfile::tempdir().unwrap();
        let area = FileArea::open(area_path(&dir))
            .unwrap()
            .with_sync_on_write(false);
        area.write("a", "1").unwrap();
        area.write("b", "2").unwrap();
        area.remove("a").unwrap();

        let reopened = FileArea::open(area_path(&dir)).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["b"]);

        area.clear().unwrap();
        let reopened = FileArea::open(area_path(&dir)).unwrap();
        assert!(reopened.keys().unwrap().is_empty());
    }

    #[test]
    fn test_remove_missing_key_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let area = FileArea::open(area_path(&dir)).unwrap();
        area.remove("missing").unwrap();
        area.clear().unwrap();
        assert!(!area_path(&dir).exists());
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(area_path(&dir), "[1, 2").unwrap();
        assert!(matches!(
            FileArea::open(area_path(&dir)),
            Err(StorageError::Persistence { .. })
        ));
    }

    #[test]
    fn test_open_empty_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(area_path(&dir), "").unwrap();
        let area = FileArea::open(area_path(&dir)).unwrap();
        assert!(area.keys().unwrap().is_empty());
    }

    #[test]
    fn test_failed_persist_leaves_entries_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.json");
        let area = FileArea::open(&path).unwrap();

        // A regular file where the parent directory should be.
        std::fs::write(dir.path().join("nested"), "").unwrap();

        assert!(area.write("k", "v").is_err());
        assert!(area.read("k").unwrap().is_none());
    }

    #[test]
    fn test_areas_sharing_a_path_keep_each_others_writes() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileArea::open(area_path(&dir)).unwrap();
        let second = FileArea::open(area_path(&dir)).unwrap();
        assert_eq!(first.path(), second.path());

        first.write("from_first", "1").unwrap();
        second.write("from_second", "2").unwrap();
        first.remove("from_second").unwrap();
        second.write("from_second", "3").unwrap();

        let reopened = FileArea::open(area_path(&dir)).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["from_first", "from_second"]);
        assert_eq!(reopened.read("from_second").unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn test_reads_see_writes_from_another_area() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FileArea::open(area_path(&dir)).unwrap();
        let writer = FileArea::open(area_path(&dir)).unwrap();

        writer.write("k", "v").unwrap();
        assert_eq!(reader.read("k").unwrap().as_deref(), Some("v"));

        writer.clear().unwrap();
        assert!(reader.keys().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_writers_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = area_path(&dir);

        let handles: Vec<_> = (0..4)
            .map(|writer| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let area = FileArea::open(&path).unwrap().with_sync_on_write(false);
                    for i in 0..10 {
                        area.write(&format!("w{writer}-{i}"), "x").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(FileArea::open(&path).unwrap().keys().unwrap().len(), 40);
    }

    #[test]
    fn test_relative_path_parent() {
        assert_eq!(parent_dir(Path::new("local.json")), Path::new("."));
        assert_eq!(parent_dir(Path::new("a/local.json")), Path::new("a"));
    }
}
