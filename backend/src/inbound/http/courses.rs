//! Course catalogue handlers.
//!
//! ```text
//! POST /api/courses                 (auth) create a course
//! GET  /api/courses?title=&minRating=&maxRating=&createdAfter=&createdBefore=&categoryId=
//! GET  /api/courses/{id}
//! POST /api/courses/{id}/comments   (auth) {"comment":"..."}
//! POST /api/courses/{id}/rate       (auth) {"rating":4.5}
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::domain::{CourseDraft, CourseFilter, CourseId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::course_dto::{
    CommentRequest, CourseListQuery, CourseResponse, CreateCourseRequest, RateRequest,
    RatingReceiptResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_uuid};

fn course_id_from_path(raw: &str) -> ApiResult<CourseId> {
    parse_uuid(raw, FieldName::new("id")).map(CourseId::from_uuid)
}

/// Publish a course authored by the signed-in user.
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateCourseRequest>,
) -> ApiResult<HttpResponse> {
    let draft = CourseDraft::try_from(payload.into_inner())?;
    let course = state.courses.create_course(user.id(), draft).await?;
    Ok(HttpResponse::Created().json(CourseResponse::from(course)))
}

/// Browse the catalogue, newest first.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseListQuery),
    responses(
        (status = 200, description = "Matching courses", body = [CourseResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listCourses",
    security([])
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    query: web::Query<CourseListQuery>,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    let filter = CourseFilter::try_from(query.into_inner())?;
    let views = state.catalogue.list_courses(&filter).await?;
    Ok(web::Json(views.into_iter().map(CourseResponse::from).collect()))
}

/// Fetch one course with its creator.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "The course", body = CourseResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "getCourse",
    security([])
)]
#[get("/courses/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CourseResponse>> {
    let id = course_id_from_path(&path)?;
    let view = state.catalogue.get_course(&id).await?;
    Ok(web::Json(view.into()))
}

/// Comment on a course as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/comments",
    params(("id" = Uuid, Path, description = "Course identifier")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment stored; returns the course", body = CourseResponse),
        (status = 400, description = "Invalid comment", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "commentOnCourse"
)]
#[post("/courses/{id}/comments")]
pub async fn comment_on_course(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let id = course_id_from_path(&path)?;
    let text = payload.into_inner().comment.unwrap_or_default();
    let course = state
        .courses
        .comment_on_course(&id, user.id(), &text)
        .await?;
    Ok(HttpResponse::Created().json(CourseResponse::from(course)))
}

/// Rate a course from 0 to 5. A second rating by the same user replaces the
/// first.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/rate",
    params(("id" = Uuid, Path, description = "Course identifier")),
    request_body = RateRequest,
    responses(
        (status = 200, description = "Updated average", body = RatingReceiptResponse),
        (status = 400, description = "Rating outside 0..=5", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "rateCourse"
)]
#[post("/courses/{id}/rate")]
pub async fn rate_course(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<RateRequest>,
) -> ApiResult<web::Json<RatingReceiptResponse>> {
    let id = course_id_from_path(&path)?;
    let score = payload
        .into_inner()
        .rating
        .ok_or_else(|| missing_field_error(FieldName::new("rating")))?;
    let receipt = state.courses.rate_course(&id, user.id(), score).await?;
    Ok(web::Json(receipt.into()))
}
