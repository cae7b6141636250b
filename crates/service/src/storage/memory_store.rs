use std::{collections::HashMap, sync::RwLock};

use super::kv_store::{KvStore, StorageError};

/// In-process key-value store with an optional byte quota, counted as the
/// sum of key and value lengths like browser storage does.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    inner: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryKvStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self { inner: RwLock::new(HashMap::new()), quota_bytes: Some(quota_bytes) }
    }

    /// Bytes currently used by all entries.
    pub fn used_bytes(&self) -> usize {
        let map = self.inner.read().unwrap_or_else(|p| p.into_inner());
        map.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.inner.read().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        if let Some(quota) = self.quota_bytes {
            let others: usize = map
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        map.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut map = self.inner.write().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(map.remove(key).is_some())
    }
}
