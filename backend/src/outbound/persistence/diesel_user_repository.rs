//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    CourseId, EmailAddress, PasswordDigest, User, UserId, UserSummary, Username,
};

use super::diesel_helpers::{is_unique_violation, map_user_diesel_error, map_user_pool_error};
use super::models::{NewFavoriteRow, NewUserRow, UserRow, UserSummaryRow};
use super::pool::DbPool;
use super::schema::{user_favorites, users};

const EMAIL_UNIQUE: &str = "users_email_key";

/// Diesel-backed user store. Favourites live in `user_favorites`.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Repository drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn stored_username(raw: String) -> Result<Username, UserPersistenceError> {
    Username::new(raw)
        .map_err(|err| UserPersistenceError::query(format!("stored username is invalid: {err}")))
}

fn row_to_user(row: UserRow, favorites: Vec<Uuid>) -> Result<User, UserPersistenceError> {
    Ok(User {
        id: UserId::from_uuid(row.id),
        username: stored_username(row.username)?,
        email: EmailAddress::from_stored(row.email),
        password_digest: PasswordDigest::new(row.password_digest),
        favorites: favorites.into_iter().map(CourseId::from_uuid).collect(),
        created_at: row.created_at,
    })
}

impl DieselUserRepository {
    async fn load_user<F>(&self, filter: F) -> Result<Option<User>, UserPersistenceError>
    where
        F: FnOnce(users::BoxedQuery<'static, diesel::pg::Pg>) -> users::BoxedQuery<'static, diesel::pg::Pg>
            + Send,
    {
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;
        let row: Option<UserRow> = filter(users::table.into_boxed())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_user_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let favorites: Vec<Uuid> = user_favorites::table
            .filter(user_favorites::user_id.eq(row.id))
            .order_by(user_favorites::created_at.asc())
            .select(user_favorites::course_id)
            .load(&mut conn)
            .await
            .map_err(map_user_diesel_error)?;
        row_to_user(row, favorites).map(Some)
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_str(),
            email: user.email.as_str(),
            password_digest: user.password_digest.as_str(),
            created_at: user.created_at,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, EMAIL_UNIQUE) {
                    UserPersistenceError::duplicate_email(user.email.as_str())
                } else {
                    map_user_diesel_error(err)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let id = *id.as_uuid();
        self.load_user(move |query| query.filter(users::id.eq(id)))
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let email = EmailAddress::normalise(email);
        self.load_user(move |query| query.filter(users::email.eq(email)))
            .await
    }

    async fn find_summaries(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<UserSummary>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<UserSummaryRow> = users::table
            .filter(users::id.eq_any(ids))
            .select(UserSummaryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_user_diesel_error)?;
        rows.into_iter()
            .map(|row| {
                Ok(UserSummary {
                    id: UserId::from_uuid(row.id),
                    username: stored_username(row.username)?,
                })
            })
            .collect()
    }

    async fn add_favorite(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;
        diesel::insert_into(user_favorites::table)
            .values(NewFavoriteRow {
                user_id: *user.as_uuid(),
                course_id: *course.as_uuid(),
            })
            .on_conflict((user_favorites::user_id, user_favorites::course_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_user_diesel_error)?;
        Ok(())
    }

    async fn remove_favorite(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_user_pool_error)?;
        diesel::delete(
            user_favorites::table
                .filter(user_favorites::user_id.eq(user.as_uuid()))
                .filter(user_favorites::course_id.eq(course.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_user_diesel_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(username: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            email: "ada@amigo.edu.co".to_owned(),
            password_digest: "$argon2id$stub".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rows_convert_with_favourites_in_order() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let user = row_to_user(row("ada"), vec![first, second]).expect("valid row");
        assert_eq!(
            user.favorites,
            vec![CourseId::from_uuid(first), CourseId::from_uuid(second)]
        );
        assert_eq!(user.email.as_str(), "ada@amigo.edu.co");
    }

    #[test]
    fn corrupt_username_surfaces_as_query_error() {
        let error = row_to_user(row("   "), Vec::new()).expect_err("blank username");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }
}
