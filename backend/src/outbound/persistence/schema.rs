//! Diesel table definitions for the PostgreSQL schema.
//!
//! These mirror `backend/migrations` exactly; update both together.

diesel::table! {
    /// Registered accounts. `email` is unique and stored lower-cased.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_digest -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Favourite course references per user. `course_id` has no foreign key.
    user_favorites (user_id, course_id) {
        user_id -> Uuid,
        course_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Course headers with the cached rating mean.
    courses (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        thumbnail_url -> Text,
        creator_id -> Uuid,
        category_id -> Uuid,
        area_id -> Nullable<Uuid>,
        average_rating -> Float8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered video list of a course.
    course_videos (course_id, position) {
        course_id -> Uuid,
        position -> Int4,
        title -> Text,
        url -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    course_comments (id) {
        id -> Uuid,
        course_id -> Uuid,
        author_id -> Uuid,
        body -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One rating per (course, author).
    course_ratings (course_id, user_id) {
        course_id -> Uuid,
        user_id -> Uuid,
        score -> Float8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(user_favorites -> users (user_id));
diesel::joinable!(courses -> users (creator_id));
diesel::joinable!(course_videos -> courses (course_id));
diesel::joinable!(course_comments -> courses (course_id));
diesel::joinable!(course_ratings -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    user_favorites,
    courses,
    course_videos,
    course_comments,
    course_ratings,
);
