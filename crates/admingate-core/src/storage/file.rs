use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{Storage, StorageError};

/// Application name used for the default storage directory
const APP_NAME: &str = "admingate";

/// Default storage file name
const STORAGE_FILE: &str = "storage.json";

/// Storage backed by a single JSON object file on disk.
///
/// The file holds a flat string-to-string map, matching a dump of the
/// browser storage area the validator was written against. Writes go
/// straight to disk so a crash never loses an accepted mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open (or create) a storage file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    /// Open the storage file at the platform default location,
    /// `<cache dir>/admingate/storage.json`
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(Self::default_path()?)
    }

    /// Platform default storage file path
    pub fn default_path() -> Result<PathBuf, StorageError> {
        let cache_dir = dirs::cache_dir().ok_or_else(|| {
            StorageError::Unavailable("could not determine cache directory".to_string())
        })?;
        Ok(cache_dir.join(APP_NAME).join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}
