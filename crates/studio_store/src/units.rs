use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::paths::{staging_file_name, unit_file_name};

/// Named persistence units. Each unit is read and written as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitKey {
    History,
    Settings,
    Language,
    Theme,
}

impl UnitKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::History => "subtitle_history",
            Self::Settings => "settings",
            Self::Language => "language",
            Self::Theme => "theme",
        }
    }
}

/// Whole-unit key-value persistence.
///
/// A unit that was never written reads back as `None`. Writes replace the
/// unit contents entirely; readers never observe a partially written unit.
pub trait UnitStore: Send + Sync {
    fn read(&self, key: UnitKey) -> Result<Option<String>, StoreError>;
    fn write(&self, key: UnitKey, contents: &str) -> Result<(), StoreError>;
    fn remove(&self, key: UnitKey) -> Result<(), StoreError>;
}

/// One JSON file per unit under a root directory.
#[derive(Debug, Clone)]
pub struct FileUnitStore {
    root: PathBuf,
}

impl FileUnitStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn unit_path(&self, key: UnitKey) -> PathBuf {
        self.root.join(unit_file_name(key))
    }
}

impl UnitStore for FileUnitStore {
    fn read(&self, key: UnitKey) -> Result<Option<String>, StoreError> {
        let path = self.unit_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::io("reading unit", path, source)),
        }
    }

    fn write(&self, key: UnitKey, contents: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .map_err(|source| StoreError::io("creating store directory", &self.root, source))?;

        let staging = self.root.join(staging_file_name(key));
        fs::write(&staging, contents)
            .map_err(|source| StoreError::io("writing staged unit", &staging, source))?;

        let path = self.unit_path(key);
        fs::rename(&staging, &path).map_err(|source| {
            let _ = fs::remove_file(&staging);
            StoreError::io("replacing unit", &path, source)
        })
    }

    fn remove(&self, key: UnitKey) -> Result<(), StoreError> {
        let path = self.unit_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::io("removing unit", path, source)),
        }
    }
}

/// In-process unit store. Clones share the same units.
#[derive(Debug, Clone, Default)]
pub struct MemoryUnitStore {
    units: Arc<Mutex<BTreeMap<UnitKey, String>>>,
    reject_writes: Arc<AtomicBool>,
}

impl MemoryUnitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `write` fail until switched back.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn insert(&self, key: UnitKey, contents: impl Into<String>) -> Result<(), StoreError> {
        self.lock("inserting unit")?.insert(key, contents.into());
        Ok(())
    }

    fn lock(
        &self,
        operation: &'static str,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<UnitKey, String>>, StoreError> {
        self.units
            .lock()
            .map_err(|_| StoreError::Poisoned { operation })
    }
}

impl UnitStore for MemoryUnitStore {
    fn read(&self, key: UnitKey) -> Result<Option<String>, StoreError> {
        Ok(self.lock("reading unit")?.get(&key).cloned())
    }

    fn write(&self, key: UnitKey, contents: &str) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::io(
                "writing unit",
                unit_file_name(key),
                std::io::Error::new(ErrorKind::PermissionDenied, "writes are rejected"),
            ));
        }
        self.lock("writing unit")?.insert(key, contents.to_owned());
        Ok(())
    }

    fn remove(&self, key: UnitKey) -> Result<(), StoreError> {
        self.lock("removing unit")?.remove(&key);
        Ok(())
    }
}
