//! Shared error mapping for the Diesel repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{CoursePersistenceError, UserPersistenceError};

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

/// Map common Diesel failures into query/connection constructors.
///
/// Detail from the database is logged at debug level and never forwarded.
pub(crate) fn map_basic_diesel_error<E, Q, C>(error: &DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    log_diesel_error(error);
    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            query("transaction serialisation failure")
        }
        _ => query("database error"),
    }
}

/// Whether `error` is a unique violation on the named constraint.
pub(crate) fn is_unique_violation(error: &DieselError, constraint: &str) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

pub(crate) fn map_user_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

pub(crate) fn map_user_diesel_error(error: DieselError) -> UserPersistenceError {
    map_basic_diesel_error(
        &error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

pub(crate) fn map_course_pool_error(error: PoolError) -> CoursePersistenceError {
    CoursePersistenceError::connection(pool_error_message(error))
}

pub(crate) fn map_course_diesel_error(error: DieselError) -> CoursePersistenceError {
    map_basic_diesel_error(
        &error,
        CoursePersistenceError::query,
        CoursePersistenceError::connection,
    )
}
