use std::{collections::HashMap, fs, path::PathBuf, sync::RwLock};

use tracing::warn;

use super::kv_store::{KvStore, StorageError};

/// JSON file-backed key-value store.
///
/// Persists a `HashMap<String, String>` to a JSON file on every write.
/// Intended for hosts without a native key-value store; a database is overkill
/// for one small blob.
#[derive(Debug)]
pub struct JsonFileKvStore {
    inner: RwLock<HashMap<String, String>>,
    file_path: PathBuf,
}

impl JsonFileKvStore {
    /// Open the store at a path. Creates the file with an empty map if missing;
    /// an unreadable file is treated as empty.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StorageError> {
        let file_path = path.into();
        common::env::ensure_data_dir(&file_path).map_err(|e| StorageError::Io(e.to_string()))?;

        let map: HashMap<String, String> = match fs::read(&file_path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "kv file unreadable; starting empty");
                HashMap::new()
            }),
            Err(_) => {
                let empty: HashMap<String, String> = HashMap::new();
                write_map(&file_path, &empty)?;
                empty
            }
        };

        Ok(Self { inner: RwLock::new(map), file_path })
    }

    pub fn path(&self) -> &std::path::Path { &self.file_path }

    /// Apply a mutation and persist; the in-memory map is restored if the
    /// write fails, so memory never runs ahead of the file.
    fn mutate<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T, StorageError> {
        let mut map = self.inner.write().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let before = map.clone();
        let out = f(&mut map);
        if let Err(e) = write_map(&self.file_path, &map) {
            *map = before;
            return Err(e);
        }
        Ok(out)
    }
}

fn write_map(path: &std::path::Path, map: &HashMap<String, String>) -> Result<(), StorageError> {
    let data = serde_json::to_vec(map).map_err(|e| StorageError::Serialization(e.to_string()))?;
    fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
}

impl KvStore for JsonFileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.inner.read().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.mutate(|m| {
            m.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.mutate(|m| m.remove(key).is_some())
    }
}
