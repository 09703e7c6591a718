//! Durable key-value slots for persisted state
//!
//! The store writes its whole transaction list under a single key. Two
//! implementations are provided:
//! - `FileSlot`: one JSON file per key inside a data directory
//! - `MemorySlot`: in-memory map, shared between clones (used by tests)

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};

/// A named slot that holds one serialized value per key
pub trait StorageSlot {
    /// Read the raw value stored under `key`, `None` when absent
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed slot: `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Create a slot rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            debug!("Created data directory: {}", dir.display());
        }
        Ok(Self { dir })
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StorageSlot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        // Write next to the target, then rename over it
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key)).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

/// In-memory slot; clones share the same contents
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    values: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: bool,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-populated with a raw value
    pub fn with_value(key: &str, value: &str) -> Self {
        let slot = Self::new();
        if let Ok(mut values) = slot.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        slot
    }

    /// Slot whose writes always fail (reads still work)
    pub fn failing() -> Self {
        Self {
            values: Arc::default(),
            fail_writes: true,
        }
    }

    /// Current raw value under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| Error::Storage("lock poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "storage is read-only",
            )));
        }
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Storage("lock poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_slot_missing_key_reads_none() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::new(dir.path()).unwrap();
        assert_eq!(slot.read("nothing").unwrap(), None);
    }

    #[test]
    fn test_file_slot_overwrites() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::new(dir.path()).unwrap();

        slot.write("k", "[1]").unwrap();
        slot.write("k", "[2]").unwrap();

        assert_eq!(slot.read("k").unwrap().as_deref(), Some("[2]"));
        assert!(slot.path_for("k").exists());
    }

    #[test]
    fn test_file_slot_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let slot = FileSlot::new(&nested).unwrap();
        slot.write("k", "x").unwrap();
        assert!(nested.join("k.json").exists());
    }

    #[test]
    fn test_memory_slot_clones_share_state() {
        let slot = MemorySlot::new();
        let other = slot.clone();
        slot.write("k", "v").unwrap();
        assert_eq!(other.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_slot_poisoned_lock_is_storage_error() {
        let slot = MemorySlot::new();
        let values = slot.values.clone();
        let _ = std::thread::spawn(move || {
            let _guard = values.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(slot.read("k"), Err(Error::Storage(_))));
        assert!(matches!(slot.write("k", "v"), Err(Error::Storage(_))));
    }

    #[test]
    fn test_memory_slot_failing_writes() {
        let slot = MemorySlot::failing();
        assert!(slot.write("k", "v").is_err());
        assert_eq!(slot.read("k").unwrap(), None);
    }
}
