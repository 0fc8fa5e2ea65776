//! PostgreSQL-backed `CourseRepository`.
//!
//! A course is spread over four tables. Reads load the header rows first and
//! then the videos, comments and ratings of every returned course in one query
//! each. Rating runs in a transaction that locks the course row, upserts on
//! `(course_id, user_id)` and recomputes `average_rating` with `AVG`, so
//! concurrent raters serialise on the course and none of their rows is lost.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::upsert::excluded;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CoursePersistenceError, CourseRepository};
use crate::domain::{
    CommentText, Course, CourseComment, CourseFilter, CourseId, CourseRating, CourseVideo,
    RatingScore, TaxonomyId, ThumbnailUrl, UserId, VideoUrl,
};

use super::diesel_helpers::{map_course_diesel_error, map_course_pool_error};
use super::models::{
    CourseCommentRow, CourseRatingRow, CourseRow, CourseVideoRow, NewCourseRatingRow,
    NewCourseRow,
};
use super::pool::DbPool;
use super::schema::{course_comments, course_ratings, course_videos, courses};

/// Diesel-backed [`CourseRepository`].
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Repository drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[derive(Default)]
struct CourseChildren {
    videos: Vec<CourseVideoRow>,
    comments: Vec<CourseCommentRow>,
    ratings: Vec<CourseRatingRow>,
}

fn assemble(row: CourseRow, children: CourseChildren) -> Course {
    let ratings: Vec<CourseRating> = children
        .ratings
        .into_iter()
        .map(|rating| CourseRating {
            author: UserId::from_uuid(rating.user_id),
            score: RatingScore::from_stored(rating.score),
            rated_at: rating.updated_at,
        })
        .collect();
    Course {
        id: CourseId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        thumbnail: ThumbnailUrl::from_stored(row.thumbnail_url),
        videos: children
            .videos
            .into_iter()
            .map(|video| CourseVideo {
                title: video.title,
                url: VideoUrl::from_stored(video.url),
                created_at: video.created_at,
            })
            .collect(),
        creator: UserId::from_uuid(row.creator_id),
        category: TaxonomyId::from_uuid(row.category_id),
        area: row.area_id.map(TaxonomyId::from_uuid),
        comments: children
            .comments
            .into_iter()
            .map(|comment| CourseComment {
                author: UserId::from_uuid(comment.author_id),
                text: CommentText::from_stored(comment.body),
                created_at: comment.created_at,
            })
            .collect(),
        ratings,
        average_rating: row.average_rating,
        created_at: row.created_at,
    }
}

/// Load children for `rows` and build courses in the same order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<CourseRow>,
) -> Result<Vec<Course>, DieselError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let videos: Vec<CourseVideoRow> = course_videos::table
        .filter(course_videos::course_id.eq_any(&ids))
        .order_by((course_videos::course_id, course_videos::position))
        .select(CourseVideoRow::as_select())
        .load(conn)
        .await?;
    let comments: Vec<CourseCommentRow> = course_comments::table
        .filter(course_comments::course_id.eq_any(&ids))
        .order_by((course_comments::created_at, course_comments::id))
        .select(CourseCommentRow::as_select())
        .load(conn)
        .await?;
    let ratings: Vec<CourseRatingRow> = course_ratings::table
        .filter(course_ratings::course_id.eq_any(&ids))
        .order_by((course_ratings::created_at, course_ratings::user_id))
        .select(CourseRatingRow::as_select())
        .load(conn)
        .await?;

    let mut children: HashMap<Uuid, CourseChildren> = HashMap::new();
    for video in videos {
        children.entry(video.course_id).or_default().videos.push(video);
    }
    for comment in comments {
        children
            .entry(comment.course_id)
            .or_default()
            .comments
            .push(comment);
    }
    for rating in ratings {
        children
            .entry(rating.course_id)
            .or_default()
            .ratings
            .push(rating);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let owned = children.remove(&row.id).unwrap_or_default();
            assemble(row, owned)
        })
        .collect())
}

fn filtered_query(filter: &CourseFilter) -> courses::BoxedQuery<'static, Pg> {
    let mut query = courses::table.into_boxed();
    if let Some(needle) = filter
        .title_contains
        .as_deref()
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
    {
        query = query.filter(courses::title.ilike(format!("%{}%", escape_like(needle))));
    }
    if let Some(min) = filter.min_rating {
        query = query.filter(courses::average_rating.ge(min));
    }
    if let Some(max) = filter.max_rating {
        query = query.filter(courses::average_rating.le(max));
    }
    if let Some(after) = filter.created_after {
        query = query.filter(courses::created_at.ge(after));
    }
    if let Some(before) = filter.created_before {
        query = query.filter(courses::created_at.le(before));
    }
    if let Some(category) = filter.category {
        query = query.filter(courses::category_id.eq(*category.as_uuid()));
    }
    query.order_by((courses::created_at.desc(), courses::id.asc()))
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError> {
        let header = NewCourseRow {
            id: *course.id.as_uuid(),
            title: &course.title,
            description: &course.description,
            thumbnail_url: course.thumbnail.as_str(),
            creator_id: *course.creator.as_uuid(),
            category_id: *course.category.as_uuid(),
            area_id: course.area.map(|area| *area.as_uuid()),
            average_rating: course.average_rating,
            created_at: course.created_at,
        };
        let videos = course
            .videos
            .iter()
            .enumerate()
            .map(|(index, video)| {
                let position = i32::try_from(index).map_err(|_| {
                    CoursePersistenceError::query("too many videos for one course")
                })?;
                Ok(CourseVideoRow {
                    course_id: *course.id.as_uuid(),
                    position,
                    title: video.title.clone(),
                    url: video.url.as_str().to_owned(),
                    created_at: video.created_at,
                })
            })
            .collect::<Result<Vec<_>, CoursePersistenceError>>()?;

        let mut conn = self.pool.get().await.map_err(map_course_pool_error)?;
        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                diesel::insert_into(courses::table)
                    .values(&header)
                    .execute(conn)
                    .await?;
                if !videos.is_empty() {
                    diesel::insert_into(course_videos::table)
                        .values(&videos)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_course_diesel_error)
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CoursePersistenceError> {
        let mut courses = self.find_many(std::slice::from_ref(id)).await?;
        Ok(courses.pop())
    }

    async fn find_many(&self, ids: &[CourseId]) -> Result<Vec<Course>, CoursePersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let wanted: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_course_pool_error)?;
        let loaded = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    let rows: Vec<CourseRow> = courses::table
                        .filter(courses::id.eq_any(&wanted))
                        .select(CourseRow::as_select())
                        .load(conn)
                        .await?;
                    hydrate(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_course_diesel_error)?;

        let mut by_id: HashMap<CourseId, Course> =
            loaded.into_iter().map(|course| (course.id, course)).collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CoursePersistenceError> {
        let query = filtered_query(filter);
        let mut conn = self.pool.get().await.map_err(map_course_pool_error)?;
        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                let rows: Vec<CourseRow> = query
                    .select(CourseRow::as_select())
                    .load(conn)
                    .await?;
                hydrate(conn, rows).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_course_diesel_error)
    }

    async fn add_comment(
        &self,
        course: &CourseId,
        comment: &CourseComment,
    ) -> Result<Option<Course>, CoursePersistenceError> {
        let course_id = *course.as_uuid();
        let row = CourseCommentRow {
            id: Uuid::new_v4(),
            course_id,
            author_id: *comment.author.as_uuid(),
            body: comment.text.as_str().to_owned(),
            created_at: comment.created_at,
        };
        let mut conn = self.pool.get().await.map_err(map_course_pool_error)?;
        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                let header: Option<CourseRow> = courses::table
                    .find(course_id)
                    .select(CourseRow::as_select())
                    .get_result(conn)
                    .await
                    .optional()?;
                let Some(header) = header else {
                    return Ok(None);
                };
                diesel::insert_into(course_comments::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok(hydrate(conn, vec![header]).await?.pop())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_course_diesel_error)
    }

    async fn apply_rating(
        &self,
        course: &CourseId,
        rating: &CourseRating,
    ) -> Result<Option<Course>, CoursePersistenceError> {
        let course_id = *course.as_uuid();
        let row = NewCourseRatingRow {
            course_id,
            user_id: *rating.author.as_uuid(),
            score: rating.score.value(),
            created_at: rating.rated_at,
            updated_at: rating.rated_at,
        };
        let mut conn = self.pool.get().await.map_err(map_course_pool_error)?;
        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                let locked: Option<Uuid> = courses::table
                    .find(course_id)
                    .select(courses::id)
                    .for_update()
                    .get_result(conn)
                    .await
                    .optional()?;
                if locked.is_none() {
                    return Ok(None);
                }

                diesel::insert_into(course_ratings::table)
                    .values(&row)
                    .on_conflict((course_ratings::course_id, course_ratings::user_id))
                    .do_update()
                    .set((
                        course_ratings::score.eq(excluded(course_ratings::score)),
                        course_ratings::updated_at.eq(excluded(course_ratings::updated_at)),
                    ))
                    .execute(conn)
                    .await?;

                let average: Option<f64> = course_ratings::table
                    .filter(course_ratings::course_id.eq(course_id))
                    .select(diesel::dsl::avg(course_ratings::score))
                    .get_result(conn)
                    .await?;

                let header: CourseRow = diesel::update(courses::table.find(course_id))
                    .set(courses::average_rating.eq(average.unwrap_or(0.0)))
                    .returning(CourseRow::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(hydrate(conn, vec![header]).await?.pop())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_course_diesel_error)
    }
}
