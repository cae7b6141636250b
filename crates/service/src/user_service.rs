use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, instrument, warn};

use models::{User, UserId, UserInput};
use crate::{clock::Clock, errors::ServiceError, storage::UserRepository};

pub const MSG_EMAIL_TAKEN: &str = "this email is already registered";
pub const MSG_EMAIL_TAKEN_BY_OTHER: &str = "this email is already registered to another user";
pub const MSG_USER_NOT_FOUND: &str = "user not found";
pub const MSG_IDS_EXHAUSTED: &str = "no user id left to assign";

/// User registry business service, independent of the rendering layer.
///
/// Every mutating call loads the whole collection, applies the change to that
/// local copy and saves it back. A failed save drops the copy, so the stored
/// collection is exactly what it was before the call.
pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self { Self { repo, clock } }

    pub fn repository(&self) -> &Arc<R> { &self.repo }

    pub fn clock(&self) -> &Arc<dyn Clock> { &self.clock }

    /// Register a new user.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::{UserService, SystemClock, ServiceError};
    /// use service::storage::{KvUserRepository, MemoryKvStore};
    /// let repo = Arc::new(KvUserRepository::new(Arc::new(MemoryKvStore::new())));
    /// let svc = UserService::new(repo, Arc::new(SystemClock));
    /// let ana = svc.create("Ana Silva", "ana@example.com").unwrap();
    /// assert_eq!(ana.email, "ana@example.com");
    /// let dup = svc.create("Outro", "ANA@EXAMPLE.COM").unwrap_err();
    /// assert!(matches!(dup, ServiceError::Conflict(_)));
    /// ```
    #[instrument(skip(self, name, email))]
    pub fn create(&self, name: &str, email: &str) -> Result<User, ServiceError> {
        let input = UserInput::parse(name, email)?;
        let mut users = self.repo.load_all();
        if users.iter().any(|u| u.has_email(&input.email)) {
            debug!(email = %input.email, "email already registered");
            return Err(ServiceError::Conflict(MSG_EMAIL_TAKEN.into()));
        }

        let now = self.now();
        let id = next_id(&users, now).ok_or_else(|| {
            warn!("stored ids leave no room for a new one");
            ServiceError::Persistence(MSG_IDS_EXHAUSTED.into())
        })?;
        let user = User::new(id, input, now);
        users.push(user.clone());
        self.repo.save_all(&users)?;
        info!(user_id = user.id, email = %user.email, "user_created");
        Ok(user)
    }

    /// All users in persisted order.
    pub fn list(&self) -> Vec<User> {
        self.repo.load_all()
    }

    pub fn find(&self, id: UserId) -> Option<User> {
        self.repo.find_by_id(id)
    }

    /// Replace a user's name and email.
    #[instrument(skip(self, name, email))]
    pub fn update(&self, id: UserId, name: &str, email: &str) -> Result<User, ServiceError> {
        let input = UserInput::parse(name, email)?;
        let mut users = self.repo.load_all();
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| ServiceError::NotFound(MSG_USER_NOT_FOUND.into()))?;
        if users.iter().any(|u| u.id != id && u.has_email(&input.email)) {
            debug!(email = %input.email, "email registered to another user");
            return Err(ServiceError::Conflict(MSG_EMAIL_TAKEN_BY_OTHER.into()));
        }

        users[idx].apply(input, self.now());
        self.repo.save_all(&users)?;
        let updated = users.swap_remove(idx);
        info!(user_id = updated.id, email = %updated.email, "user_updated");
        Ok(updated)
    }

    /// Remove a user.
    #[instrument(skip(self))]
    pub fn delete(&self, id: UserId) -> Result<(), ServiceError> {
        let mut users = self.repo.load_all();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(ServiceError::NotFound(MSG_USER_NOT_FOUND.into()));
        }
        self.repo.save_all(&users)?;
        info!(user_id = id, "user_deleted");
        Ok(())
    }

    /// Timestamps are kept at the millisecond precision they are stored with.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }
}

/// Creation time in milliseconds, bumped past the largest existing id when
/// two records land on the same millisecond or the clock went backwards.
/// `None` once the largest id is `i64::MAX`.
fn next_id(users: &[User], now: DateTime<Utc>) -> Option<UserId> {
    let candidate = now.timestamp_millis();
    match users.iter().map(|u| u.id).max() {
        Some(max) if candidate <= max => max.checked_add(1),
        _ => Some(candidate),
    }
}
