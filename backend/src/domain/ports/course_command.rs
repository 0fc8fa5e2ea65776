//! Driving port for course mutations.

use async_trait::async_trait;

use crate::domain::{Course, CourseDraft, CourseId, Error, RatingReceipt, UserId};

/// Write side of the catalogue: creation, comments and ratings.
#[async_trait]
pub trait CourseCommand: Send + Sync {
    async fn create_course(&self, creator: &UserId, draft: CourseDraft) -> Result<Course, Error>;

    async fn comment_on_course(
        &self,
        course: &CourseId,
        author: &UserId,
        text: &str,
    ) -> Result<Course, Error>;

    /// Upsert the author's rating and return the refreshed average.
    ///
    /// The score is validated before the course is looked up, so an invalid
    /// score never touches storage.
    async fn rate_course(
        &self,
        course: &CourseId,
        author: &UserId,
        score: f64,
    ) -> Result<RatingReceipt, Error>;
}
