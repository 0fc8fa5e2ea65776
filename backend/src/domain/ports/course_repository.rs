//! Driven port for course storage, including the atomic rating upsert.

use async_trait::async_trait;

use crate::domain::{Course, CourseComment, CourseFilter, CourseId, CourseRating};

use super::define_port_error;

define_port_error! {
    /// Failures raised by course repository adapters.
    pub enum CoursePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course repository query failed: {message}",
    }
}

/// Course storage.
///
/// Mutating operations return the course as stored afterwards, or `None`
/// when no course has the given id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError>;

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CoursePersistenceError>;

    /// Courses for the given ids, skipping ids that no longer resolve.
    async fn find_many(&self, ids: &[CourseId]) -> Result<Vec<Course>, CoursePersistenceError>;

    /// Courses matching `filter`, newest first.
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CoursePersistenceError>;

    async fn add_comment(
        &self,
        course: &CourseId,
        comment: &CourseComment,
    ) -> Result<Option<Course>, CoursePersistenceError>;

    /// Upsert `rating` by author and recompute the average in one atomic
    /// step. Concurrent calls for different authors must all be kept.
    async fn apply_rating(
        &self,
        course: &CourseId,
        rating: &CourseRating,
    ) -> Result<Option<Course>, CoursePersistenceError>;
}
