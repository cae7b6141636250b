use std::sync::Arc;

use models::{User, UserId};
use tracing::{debug, warn};

use super::kv_store::KvStore;
use crate::errors::ServiceError;

/// Default key the collection blob lives under.
pub const DEFAULT_USERS_KEY: &str = "users";

/// Whole-collection persistence for user records.
///
/// There are no partial updates: callers load everything, change it, and
/// save everything back.
pub trait UserRepository: Send + Sync {
    /// Load the collection in persisted order. Missing or unparsable data
    /// yields an empty collection.
    fn load_all(&self) -> Vec<User>;

    /// Persist the full collection. The only error is `ServiceError::Persistence`.
    fn save_all(&self, users: &[User]) -> Result<(), ServiceError>;

    /// Linear scan over `load_all`.
    fn find_by_id(&self, id: UserId) -> Option<User> {
        self.load_all().into_iter().find(|u| u.id == id)
    }
}

/// Stores the collection as one JSON array under a fixed key of a `KvStore`.
pub struct KvUserRepository<S: KvStore + ?Sized> {
    store: Arc<S>,
    key: String,
}

impl<S: KvStore + ?Sized> KvUserRepository<S> {
    pub fn new(store: Arc<S>) -> Self { Self::with_key(store, DEFAULT_USERS_KEY) }

    pub fn with_key(store: Arc<S>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub fn store(&self) -> &Arc<S> { &self.store }

    pub fn key(&self) -> &str { &self.key }
}

impl<S: KvStore + ?Sized> UserRepository for KvUserRepository<S> {
    fn load_all(&self) -> Vec<User> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read users; treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<User>>(&raw) {
            Ok(users) => users,
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored users are not valid JSON; treating as empty");
                Vec::new()
            }
        }
    }

    fn save_all(&self, users: &[User]) -> Result<(), ServiceError> {
        let data = serde_json::to_string(users).map_err(|e| {
            warn!(error = %e, "failed to serialize users");
            ServiceError::Persistence(format!("could not serialize users: {e}"))
        })?;
        self.store.set(&self.key, data).map_err(|e| {
            warn!(key = %self.key, error = %e, "failed to save users");
            ServiceError::Persistence(format!("could not save users: {e}"))
        })?;
        debug!(key = %self.key, count = users.len(), "users saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{kv_store::mock::SwitchableKvStore, MemoryKvStore};
    use chrono::{TimeZone, Utc};
    use models::UserInput;

    fn user(id: UserId, name: &str, email: &str) -> User {
        let at = Utc.timestamp_millis_opt(id).single().unwrap();
        User::new(id, UserInput::parse(name, email).unwrap(), at)
    }

    #[test]
    fn empty_store_loads_empty() {
        let repo = KvUserRepository::new(Arc::new(MemoryKvStore::new()));
        assert!(repo.load_all().is_empty());
        assert_eq!(repo.find_by_id(1), None);
    }

    #[test]
    fn save_then_load_preserves_order() -> Result<(), ServiceError> {
        let repo = KvUserRepository::new(Arc::new(MemoryKvStore::new()));
        let users = vec![user(3, "C", "c@x.io"), user(1, "A", "a@x.io"), user(2, "B", "b@x.io")];
        repo.save_all(&users)?;
        assert_eq!(repo.load_all(), users);
        assert_eq!(repo.find_by_id(1).map(|u| u.name), Some("A".to_string()));
        Ok(())
    }

    #[test]
    fn save_all_of_load_all_is_idempotent() -> Result<(), ServiceError> {
        let store = Arc::new(MemoryKvStore::new());
        let repo = KvUserRepository::new(store.clone());
        let mut edited = user(5, "E", "e@x.io");
        edited.apply(UserInput::parse("E2", "e2@x.io").unwrap(), Utc::now());
        repo.save_all(&[user(4, "D", "d@x.io"), edited])?;

        let first = repo.load_all();
        let raw_before = store.get(DEFAULT_USERS_KEY).ok().flatten();
        repo.save_all(&first)?;
        assert_eq!(repo.load_all(), first);
        assert_eq!(store.get(DEFAULT_USERS_KEY).ok().flatten(), raw_before);
        Ok(())
    }

    #[test]
    fn corrupt_blob_is_swallowed() {
        let store = Arc::new(MemoryKvStore::new());
        store.set(DEFAULT_USERS_KEY, "{definitely not an array".into()).unwrap();
        let repo = KvUserRepository::new(store);
        assert!(repo.load_all().is_empty());
    }

    #[test]
    fn read_failure_is_swallowed() {
        let store = Arc::new(SwitchableKvStore::default());
        let repo = KvUserRepository::new(store.clone());
        repo.save_all(&[user(1, "A", "a@x.io")]).unwrap();
        store.fail_reads(true);
        assert!(repo.load_all().is_empty());
    }

    #[test]
    fn write_failure_is_reported_not_panicked() {
        let store = Arc::new(MemoryKvStore::with_quota(16));
        let repo = KvUserRepository::new(store);
        let err = repo.save_all(&[user(1, "A", "a@x.io")]).unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
    }

    #[test]
    fn works_behind_a_trait_object() -> Result<(), ServiceError> {
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let repo = KvUserRepository::new(store);
        repo.save_all(&[user(1, "A", "a@x.io")])?;
        assert_eq!(repo.load_all().len(), 1);
        Ok(())
    }

    #[test]
    fn custom_key_is_used() -> Result<(), ServiceError> {
        let store = Arc::new(MemoryKvStore::new());
        let repo = KvUserRepository::with_key(store.clone(), "people");
        repo.save_all(&[user(1, "A", "a@x.io")])?;
        assert!(store.get("people").ok().flatten().is_some());
        assert!(store.get(DEFAULT_USERS_KEY).ok().flatten().is_none());
        Ok(())
    }
}
