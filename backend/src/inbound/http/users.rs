//! Account, session and favourites handlers.
//!
//! ```text
//! POST   /api/users/register {"username":"ana","email":"ana@amigo.edu.co","password":"Str0ng!pw"}
//! POST   /api/users/login    {"email":"ana@amigo.edu.co","password":"Str0ng!pw"}
//! GET    /api/users/validate
//! GET    /api/users/me/favorites
//! PUT    /api/users/me/favorites/{courseId}
//! DELETE /api/users/me/favorites/{courseId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{AuthenticatedSession, CourseId, LoginCredentials, Registration, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::course_dto::CourseResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session_cookies::attach_session_cookies;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, login_error, parse_uuid, registration_error};

/// Request body for `POST /api/users/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ana")]
    pub username: Option<String>,
    #[schema(example = "ana@amigo.edu.co")]
    pub email: Option<String>,
    #[schema(example = "Str0ng!pw")]
    pub password: Option<String>,
}

/// Request body for `POST /api/users/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ana@amigo.edu.co")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public projection of an account; never carries the password digest.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub favorites: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            id: *value.id.as_uuid(),
            username: value.username.into(),
            email: value.email.as_str().to_owned(),
            favorites: value.favorites.iter().map(|id| *id.as_uuid()).collect(),
            created_at: value.created_at,
        }
    }
}

/// Response body for a successful registration.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[schema(example = "user registered")]
    pub message: String,
    pub user: UserProfileResponse,
    /// Access token, also set in the `access_token` cookie.
    pub token: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token, also set in the `access_token` cookie.
    pub token: String,
}

fn session_response(
    mut builder: actix_web::HttpResponseBuilder,
    state: &HttpState,
    session: &AuthenticatedSession,
    body: impl Serialize,
) -> HttpResponse {
    attach_session_cookies(&mut builder, &session.tokens, state.cookies);
    builder.json(body)
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse,
            headers(("Set-Cookie" = String, description = "access_token and refresh_token cookies"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(
        username.as_deref().unwrap_or_default(),
        email.as_deref().unwrap_or_default(),
        password.as_deref().unwrap_or_default(),
        &state.email_policy,
    )
    .map_err(|err| registration_error(&err))?;

    let session = state.accounts.register(registration).await?;
    let body = RegisterResponse {
        message: "user registered".to_owned(),
        token: session.tokens.access.value.clone(),
        user: session.user.clone().into(),
    };
    Ok(session_response(HttpResponse::Created(), &state, &session, body))
}

/// Exchange credentials for a session.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "access_token and refresh_token cookies"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        email.as_deref().unwrap_or_default(),
        password.as_deref().unwrap_or_default(),
    )
    .map_err(login_error)?;

    let session = state.accounts.login(credentials).await?;
    let body = LoginResponse {
        token: session.tokens.access.value.clone(),
    };
    Ok(session_response(HttpResponse::Ok(), &state, &session, body))
}

/// Resolve the presented access token to its account.
#[utoipa::path(
    get,
    path = "/api/users/validate",
    responses(
        (status = 200, description = "Token is valid", body = UserProfileResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "validateToken"
)]
#[get("/users/validate")]
pub async fn validate(user: AuthenticatedUser) -> web::Json<UserProfileResponse> {
    web::Json(user.into_profile().into())
}

/// Courses the signed-in user marked as favourite.
#[utoipa::path(
    get,
    path = "/api/users/me/favorites",
    responses(
        (status = 200, description = "Favourite courses", body = [CourseResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["favorites"],
    operation_id = "listFavorites"
)]
#[get("/users/me/favorites")]
pub async fn list_favorites(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    let views = state.favorites_query.list_favorites(user.id()).await?;
    Ok(web::Json(views.into_iter().map(CourseResponse::from).collect()))
}

fn course_id_from_path(raw: &str) -> ApiResult<CourseId> {
    parse_uuid(raw, FieldName::new("courseId")).map(CourseId::from_uuid)
}

/// Add a course to the signed-in user's favourites. Idempotent.
#[utoipa::path(
    put,
    path = "/api/users/me/favorites/{courseId}",
    params(("courseId" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 204, description = "Course is a favourite"),
        (status = 400, description = "Malformed course id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["favorites"],
    operation_id = "addFavorite"
)]
#[put("/users/me/favorites/{courseId}")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let course = course_id_from_path(&path)?;
    state.favorites.add_favorite(user.id(), &course).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a course from the signed-in user's favourites. Idempotent.
#[utoipa::path(
    delete,
    path = "/api/users/me/favorites/{courseId}",
    params(("courseId" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 204, description = "Course is not a favourite"),
        (status = 400, description = "Malformed course id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["favorites"],
    operation_id = "removeFavorite"
)]
#[delete("/users/me/favorites/{courseId}")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let course = course_id_from_path(&path)?;
    state.favorites.remove_favorite(user.id(), &course).await?;
    Ok(HttpResponse::NoContent().finish())
}
