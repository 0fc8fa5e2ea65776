//! Driven port for account storage.

use async_trait::async_trait;

use crate::domain::{CourseId, User, UserId, UserSummary};

use super::define_port_error;

define_port_error! {
    /// Failures raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The email is already taken by another account.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Account storage.
///
/// Emails are stored and looked up in their normalised form, and must be
/// unique; `insert` reports a clash as [`UserPersistenceError::DuplicateEmail`]
/// even when two registrations race past the service's pre-check.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError>;

    /// Public projections for the given ids. Unknown ids are skipped.
    async fn find_summaries(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<UserSummary>, UserPersistenceError>;

    /// Record a favourite; adding one twice keeps a single reference.
    async fn add_favorite(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<(), UserPersistenceError>;

    /// Drop a favourite; absent references are ignored.
    async fn remove_favorite(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<(), UserPersistenceError>;
}
