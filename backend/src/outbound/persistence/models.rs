//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; repositories convert them to
//! domain types before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    course_comments, course_ratings, course_videos, courses, user_favorites, users,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_digest: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserSummaryRow {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_favorites)]
pub(crate) struct NewFavoriteRow {
    pub user_id: Uuid,
    pub course_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub creator_id: Uuid,
    pub category_id: Uuid,
    pub area_id: Option<Uuid>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub thumbnail_url: &'a str,
    pub creator_id: Uuid,
    pub category_id: Uuid,
    pub area_id: Option<Uuid>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = course_videos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseVideoRow {
    pub course_id: Uuid,
    pub position: i32,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = course_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseCommentRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = course_ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRatingRow {
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = course_ratings)]
pub(crate) struct NewCourseRatingRow {
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
