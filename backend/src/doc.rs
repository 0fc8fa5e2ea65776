//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every HTTP endpoint of the inbound layer together with
//! the request/response payloads and the error envelope. Authenticated
//! operations accept the access token either as a bearer header or as the
//! `access_token` cookie set by register and login.
//!
//! The document is served by Swagger UI in debug builds and exported with
//! `cargo run --bin openapi-dump` for client generation.

use crate::inbound::http::course_dto::{
    CommentRequest, CommentResponse, CourseResponse, CreateCourseRequest, CreatorResponse,
    RateRequest, RatingReceiptResponse, RatingResponse, VideoRequest, VideoResponse,
};
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserProfileResponse,
};
use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

const BEARER_SCHEME: &str = "BearerToken";
const COOKIE_SCHEME: &str = "AccessTokenCookie";

/// Register both ways of presenting an access token.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token from register or login."))
                    .build(),
            ),
        );
        components.add_security_scheme(
            COOKIE_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "access_token",
                "HttpOnly cookie set by POST /api/users/register and /api/users/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus backend API",
        description = "Accounts, JWT sessions, course catalogue, ratings and favourites."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = []), ("AccessTokenCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::validate,
        crate::inbound::http::users::list_favorites,
        crate::inbound::http::users::add_favorite,
        crate::inbound::http::users::remove_favorite,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::comment_on_course,
        crate::inbound::http::courses::rate_course,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        UserProfileResponse,
        CreateCourseRequest,
        VideoRequest,
        CourseResponse,
        CreatorResponse,
        VideoResponse,
        CommentResponse,
        RatingResponse,
        CommentRequest,
        RateRequest,
        RatingReceiptResponse,
        ProbeStatus,
    )),
    tags(
        (name = "users", description = "Registration, login and token validation"),
        (name = "favorites", description = "The signed-in user's saved courses"),
        (name = "courses", description = "Course catalogue, comments and ratings"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
