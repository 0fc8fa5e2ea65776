//! Course catalogue use-cases: authoring, commenting, rating and browsing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    CourseCommand, CoursePersistenceError, CourseQuery, CourseRepository, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    CommentText, Course, CourseComment, CourseDraft, CourseFilter, CourseId, CourseRating,
    CourseValidationError, CourseView, Error, RatingReceipt, RatingScore, UserId, UserSummary,
};

pub(crate) fn map_course_error(error: CoursePersistenceError) -> Error {
    match error {
        CoursePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("course repository unavailable: {message}"))
        }
        CoursePersistenceError::Query { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
    }
}

pub(crate) fn map_user_lookup_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

pub(crate) fn invalid_course_input(error: &CourseValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "field": error.field() }))
}

pub(crate) fn course_not_found(id: &CourseId) -> Error {
    Error::not_found(format!("course {id} not found"))
}

/// Attach creator summaries to courses with a single user lookup.
///
/// Courses whose creator has gone missing are kept with `creator: None`.
pub(crate) async fn resolve_creators<U>(
    users: &U,
    courses: Vec<Course>,
) -> Result<Vec<CourseView>, Error>
where
    U: UserRepository + ?Sized,
{
    let mut ids: Vec<UserId> = courses.iter().map(|course| course.creator).collect();
    ids.sort_unstable_by_key(|id| *id.as_uuid());
    ids.dedup();

    let summaries: HashMap<UserId, UserSummary> = users
        .find_summaries(&ids)
        .await
        .map_err(map_user_lookup_error)?
        .into_iter()
        .map(|summary| (summary.id, summary))
        .collect();

    Ok(courses
        .into_iter()
        .map(|course| {
            let creator = summaries.get(&course.creator).cloned();
            CourseView { course, creator }
        })
        .collect())
}

/// Course use-cases over a course store and a user store.
pub struct CourseService<C, U> {
    courses: Arc<C>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<C, U> CourseService<C, U> {
    /// Service over the given repositories. `clock` stamps courses, comments
    /// and ratings.
    pub fn new(courses: Arc<C>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            courses,
            users,
            clock,
        }
    }
}

#[async_trait]
impl<C, U> CourseCommand for CourseService<C, U>
where
    C: CourseRepository,
    U: UserRepository,
{
    async fn create_course(&self, creator: &UserId, draft: CourseDraft) -> Result<Course, Error> {
        let course = Course::from_draft(CourseId::random(), *creator, draft, self.clock.utc());
        self.courses
            .insert(&course)
            .await
            .map_err(map_course_error)?;
        info!(course_id = %course.id, creator = %creator, "course created");
        Ok(course)
    }

    async fn comment_on_course(
        &self,
        course: &CourseId,
        author: &UserId,
        text: &str,
    ) -> Result<Course, Error> {
        let text = CommentText::new(text).map_err(|err| invalid_course_input(&err))?;
        let comment = CourseComment {
            author: *author,
            text,
            created_at: self.clock.utc(),
        };
        let updated = self
            .courses
            .add_comment(course, &comment)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| course_not_found(course))?;
        debug!(course_id = %course, author = %author, "comment added");
        Ok(updated)
    }

    async fn rate_course(
        &self,
        course: &CourseId,
        author: &UserId,
        score: f64,
    ) -> Result<RatingReceipt, Error> {
        let score = RatingScore::new(score).map_err(|err| invalid_course_input(&err))?;
        let rating = CourseRating {
            author: *author,
            score,
            rated_at: self.clock.utc(),
        };
        let updated = self
            .courses
            .apply_rating(course, &rating)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| course_not_found(course))?;
        let receipt = RatingReceipt::from(&updated);
        info!(
            course_id = %course,
            author = %author,
            average = receipt.average_rating,
            count = receipt.ratings_count,
            "rating applied"
        );
        Ok(receipt)
    }
}

#[async_trait]
impl<C, U> CourseQuery for CourseService<C, U>
where
    C: CourseRepository,
    U: UserRepository,
{
    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<CourseView>, Error> {
        filter.validate().map_err(|err| invalid_course_input(&err))?;
        let courses = self.courses.list(filter).await.map_err(map_course_error)?;
        resolve_creators(self.users.as_ref(), courses).await
    }

    async fn get_course(&self, id: &CourseId) -> Result<CourseView, Error> {
        let course = self
            .courses
            .find_by_id(id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| course_not_found(id))?;
        let mut views = resolve_creators(self.users.as_ref(), vec![course]).await?;
        views
            .pop()
            .ok_or_else(|| Error::internal("course view vanished during resolution"))
    }
}

#[cfg(test)]
mod tests;
