//! Ports at the edge of the domain.
//!
//! Driving ports (`*Command`, `*Query`, [`SessionValidator`]) are what inbound
//! adapters call. Driven ports (repositories, [`PasswordHasher`],
//! [`SessionTokenCodec`]) are what the services call; each reports failures
//! through its own error enum.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod course_command;
mod course_query;
mod course_repository;
mod favorites;
mod password_hasher;
mod session_token_codec;
mod session_validator;
mod user_repository;

pub use account_command::AccountCommand;
pub use course_command::CourseCommand;
pub use course_query::CourseQuery;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CoursePersistenceError, CourseRepository};
pub use favorites::{FavoritesCommand, FavoritesQuery};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use session_token_codec::MockSessionTokenCodec;
pub use session_token_codec::{SessionTokenCodec, SessionTokenError};
pub use session_validator::SessionValidator;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
