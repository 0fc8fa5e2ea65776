//! Driving port for reading the course catalogue.

use async_trait::async_trait;

use crate::domain::{CourseFilter, CourseId, CourseView, Error};

/// Read side of the catalogue.
#[async_trait]
pub trait CourseQuery: Send + Sync {
    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<CourseView>, Error>;

    async fn get_course(&self, id: &CourseId) -> Result<CourseView, Error>;
}
