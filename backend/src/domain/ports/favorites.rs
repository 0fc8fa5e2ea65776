//! Driving ports for a user's favourite courses.

use async_trait::async_trait;

use crate::domain::{CourseId, CourseView, Error, UserId};

/// Adds and removes favourites. Both operations are idempotent.
#[async_trait]
pub trait FavoritesCommand: Send + Sync {
    /// Fails with `NotFound` when the course does not exist.
    async fn add_favorite(&self, user: &UserId, course: &CourseId) -> Result<(), Error>;

    /// Succeeds whether or not the course was a favourite.
    async fn remove_favorite(&self, user: &UserId, course: &CourseId) -> Result<(), Error>;
}

/// Lists a user's favourite courses.
#[async_trait]
pub trait FavoritesQuery: Send + Sync {
    /// Favourites that still resolve to a course.
    async fn list_favorites(&self, user: &UserId) -> Result<Vec<CourseView>, Error>;
}
