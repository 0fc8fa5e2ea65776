//! PostgreSQL persistence adapters built on Diesel.
//!
//! Repositories are thin translators between row structs (`models`) and
//! domain types; they hold no business rules beyond what the schema enforces.
//! Connections come from a `bb8` pool through `diesel-async`.
//!
//! ```ignore
//! use campus_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/campus")).await?;
//! let users = DieselUserRepository::new(pool.clone());
//! ```

mod diesel_course_repository;
pub(crate) mod diesel_helpers;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
