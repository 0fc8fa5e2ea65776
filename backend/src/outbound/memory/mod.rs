//! Process-local repositories.
//!
//! These back the server when no database URL is configured and give the
//! HTTP tests a real store without PostgreSQL. State is lost on restart.

mod in_memory_course_repository;
mod in_memory_user_repository;

pub use in_memory_course_repository::InMemoryCourseRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
