//! `UserRepository` over a mutex-guarded map.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{CourseId, EmailAddress, User, UserId, UserSummary};

#[derive(Default)]
struct Accounts {
    by_id: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
}

/// Process-local user store used without a database and in tests.
#[derive(Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<Accounts>,
}

impl InMemoryUserRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Accounts>, UserPersistenceError> {
        self.accounts
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut accounts = self.lock()?;
        let email = user.email.as_str().to_owned();
        if accounts.by_email.contains_key(&email) {
            return Err(UserPersistenceError::duplicate_email(email));
        }
        accounts.by_email.insert(email, user.id);
        accounts.by_id.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.by_id.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let accounts = self.lock()?;
        Ok(accounts
            .by_email
            .get(&EmailAddress::normalise(email))
            .and_then(|id| accounts.by_id.get(id))
            .cloned())
    }

    async fn find_summaries(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<UserSummary>, UserPersistenceError> {
        let accounts = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| accounts.by_id.get(id))
            .map(User::summary)
            .collect())
    }

    async fn add_favorite(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<(), UserPersistenceError> {
        let mut accounts = self.lock()?;
        let account = accounts
            .by_id
            .get_mut(user)
            .ok_or_else(|| UserPersistenceError::query(format!("unknown user {user}")))?;
        if !account.favorites.contains(course) {
            account.favorites.push(*course);
        }
        Ok(())
    }

    async fn remove_favorite(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<(), UserPersistenceError> {
        let mut accounts = self.lock()?;
        if let Some(account) = accounts.by_id.get_mut(user) {
            account.favorites.retain(|favorite| favorite != course);
        }
        Ok(())
    }
}
