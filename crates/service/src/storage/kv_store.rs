use thiserror::Error;

/// Failures raised by a key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Host key-value string store. Implementations can be in-memory,
/// file-backed, or a browser storage shim.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
    /// Remove a key; returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

/// Store doubles for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::storage::MemoryKvStore;

    /// Memory store whose writes can be switched off to simulate a full or
    /// read-only medium.
    #[derive(Default)]
    pub struct SwitchableKvStore {
        inner: MemoryKvStore,
        writes_fail: AtomicBool,
        reads_fail: AtomicBool,
    }

    impl SwitchableKvStore {
        pub fn fail_writes(&self, fail: bool) { self.writes_fail.store(fail, Ordering::SeqCst); }
        pub fn fail_reads(&self, fail: bool) { self.reads_fail.store(fail, Ordering::SeqCst); }
    }

    impl KvStore for SwitchableKvStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.reads_fail.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("reads disabled".into()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
            if self.writes_fail.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("writes disabled".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<bool, StorageError> {
            if self.writes_fail.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("writes disabled".into()));
            }
            self.inner.remove(key)
        }
    }
}
