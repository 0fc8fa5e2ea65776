//! `CourseRepository` over a mutex-guarded map.
//!
//! Every mutation runs under the one lock, which makes the rating upsert and
//! average refresh a single step.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{CoursePersistenceError, CourseRepository};
use crate::domain::{Course, CourseComment, CourseFilter, CourseId, CourseRating};

/// Process-local course store. Each mutation runs under one lock, so a
/// rating upsert and its average refresh are atomic.
#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: Mutex<HashMap<CourseId, Course>>,
}

impl InMemoryCourseRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CourseId, Course>>, CoursePersistenceError> {
        self.courses
            .lock()
            .map_err(|_| CoursePersistenceError::query("course store lock poisoned"))
    }

    fn mutate<F>(&self, id: &CourseId, change: F) -> Result<Option<Course>, CoursePersistenceError>
    where
        F: FnOnce(&mut Course),
    {
        let mut courses = self.lock()?;
        Ok(courses.get_mut(id).map(|course| {
            change(course);
            course.clone()
        }))
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError> {
        self.lock()?.insert(course.id, course.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CoursePersistenceError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn find_many(&self, ids: &[CourseId]) -> Result<Vec<Course>, CoursePersistenceError> {
        let courses = self.lock()?;
        Ok(ids.iter().filter_map(|id| courses.get(id)).cloned().collect())
    }

    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CoursePersistenceError> {
        let mut matching: Vec<Course> = self
            .lock()?
            .values()
            .filter(|course| filter.matches(course))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matching)
    }

    async fn add_comment(
        &self,
        course: &CourseId,
        comment: &CourseComment,
    ) -> Result<Option<Course>, CoursePersistenceError> {
        self.mutate(course, |stored| stored.add_comment(comment.clone()))
    }

    async fn apply_rating(
        &self,
        course: &CourseId,
        rating: &CourseRating,
    ) -> Result<Option<Course>, CoursePersistenceError> {
        self.mutate(course, |stored| {
            stored.apply_rating(*rating);
        })
    }
}
