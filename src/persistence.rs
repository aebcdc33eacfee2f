//! Persisted key-value storage
//!
//! Small string-to-string store that survives restarts, the local equivalent
//! of browser local storage. Only the manifest fingerprint lives here today.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access storage file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize storage: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// JSON object file, read once on open and rewritten whole on every write
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Default location: `<data_dir>/video-gallery/storage.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::storage::FILENAME);
        path
    }

    /// Open storage at `path`
    /// A missing file is an empty store. A corrupt file is logged and read as
    /// empty; it is left on disk until the next successful write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = Self::read_items(&path);
        debug!(path = %path.display(), keys = items.len(), "Opened storage");
        Self {
            path,
            items: Mutex::new(items),
        }
    }

    fn read_items(path: &Path) -> HashMap<String, String> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read storage file, starting empty");
                return HashMap::new();
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&contents) {
            Ok(map) => map
                .into_iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => Some((k, s)),
                    other => {
                        warn!(key = %k, value = %other, "Ignoring non-string storage value");
                        None
                    }
                })
                .collect(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Storage file is not a JSON object, starting empty");
                HashMap::new()
            }
        }
    }

    fn write_items(&self, items: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let contents = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, contents).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
        self.write_items(&items)
    }
}

/// Non-persistent storage, for tests and `--storage memory`
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("storage.json"));
        assert_eq!(storage.get_item("videos_manifest_hash"), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::open(&path);
        storage.set_item("videos_manifest_hash", "abc123").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get_item("videos_manifest_hash").as_deref(), Some("abc123"));
    }

    #[test]
    fn test_file_storage_overwrites_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::open(&path);
        storage.set_item("k", "one").unwrap();
        storage.set_item("k", "two").unwrap();

        assert_eq!(FileStorage::open(&path).get_item("k").as_deref(), Some("two"));
    }

    #[test]
    fn test_file_storage_corrupt_file_reads_empty_and_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ not json").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get_item("k"), None);
        // Nothing written yet, broken file untouched
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_file_storage_skips_non_string_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, r#"{"a": "x", "b": 3}"#).unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get_item("a").as_deref(), Some("x"));
        assert_eq!(storage.get_item("b"), None);
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::with_item("k", "v");
        assert_eq!(storage.get_item("k").as_deref(), Some("v"));
        storage.set_item("k", "w").unwrap();
        assert_eq!(storage.get_item("k").as_deref(), Some("w"));
    }
}
