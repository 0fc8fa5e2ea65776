//! A user's favourite courses.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::course_service::{
    course_not_found, map_course_error, map_user_lookup_error, resolve_creators,
};
use crate::domain::ports::{CourseRepository, FavoritesCommand, FavoritesQuery, UserRepository};
use crate::domain::{CourseId, CourseView, Error, UserId};

/// Favourite-course use-cases over a course store and a user store.
///
/// Adding checks the course exists; removing and listing do not, and the
/// list silently drops favourites whose course has been deleted.
pub struct FavoritesService<C, U> {
    courses: Arc<C>,
    users: Arc<U>,
}

impl<C, U> FavoritesService<C, U> {
    /// Service over the given repositories.
    pub fn new(courses: Arc<C>, users: Arc<U>) -> Self {
        Self { courses, users }
    }
}

#[async_trait]
impl<C, U> FavoritesCommand for FavoritesService<C, U>
where
    C: CourseRepository,
    U: UserRepository,
{
    async fn add_favorite(&self, user: &UserId, course: &CourseId) -> Result<(), Error> {
        self.courses
            .find_by_id(course)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| course_not_found(course))?;
        self.users
            .add_favorite(user, course)
            .await
            .map_err(map_user_lookup_error)?;
        debug!(user_id = %user, course_id = %course, "favourite added");
        Ok(())
    }

    async fn remove_favorite(&self, user: &UserId, course: &CourseId) -> Result<(), Error> {
        self.users
            .remove_favorite(user, course)
            .await
            .map_err(map_user_lookup_error)?;
        debug!(user_id = %user, course_id = %course, "favourite removed");
        Ok(())
    }
}

#[async_trait]
impl<C, U> FavoritesQuery for FavoritesService<C, U>
where
    C: CourseRepository,
    U: UserRepository,
{
    async fn list_favorites(&self, user: &UserId) -> Result<Vec<CourseView>, Error> {
        let owner = self
            .users
            .find_by_id(user)
            .await
            .map_err(map_user_lookup_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let courses = self
            .courses
            .find_many(&owner.favorites)
            .await
            .map_err(map_course_error)?;
        resolve_creators(self.users.as_ref(), courses).await
    }
}
