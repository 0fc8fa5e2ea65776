//! HTTP inbound adapter exposing the JSON API and health probes.

pub mod auth;
pub mod course_dto;
pub mod courses;
pub mod error;
pub mod health;
pub mod routes;
pub mod schemas;
pub mod session_cookies;
pub mod state;
pub mod token_config;
pub mod users;
pub(crate) mod validation;

pub use error::ApiResult;
