//! Outbound adapters implementing the driven domain ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel and a `bb8` pool
//! - **memory**: process-local repositories for development and tests
//! - **security**: Argon2id password hashing and HS256 session tokens
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no business rules.

pub mod memory;
pub mod persistence;
pub mod security;
