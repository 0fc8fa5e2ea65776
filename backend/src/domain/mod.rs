//! Domain primitives, aggregates and services.
//!
//! Purpose: hold the account and course model, the ports the services depend
//! on, and the services that implement the driving ports. Nothing here knows
//! about HTTP or SQL.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: the error payload every adapter reports.
//! - [`User`], [`Registration`], [`LoginCredentials`]: account model.
//! - [`Course`], [`CourseDraft`], [`CourseFilter`]: catalogue model.
//! - [`AccountService`], [`CourseService`], [`FavoritesService`]: use-cases.

pub mod account_service;
pub mod auth;
pub mod course;
pub mod course_service;
pub mod error;
pub mod favorites_service;
pub mod ports;
pub mod session;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN_LEN, PASSWORD_SYMBOLS, Password,
    PasswordPolicyViolation, Registration, RegistrationValidationError,
};
pub use self::course::{
    COMMENT_MAX, CommentText, Course, CourseComment, CourseDraft, CourseFilter, CourseId,
    CourseRating, CourseValidationError, CourseVideo, CourseView, RATING_MAX, RATING_MIN,
    RatingOutcome, RatingReceipt, RatingScore, TaxonomyId, ThumbnailUrl, VIDEOS_MAX, VideoDraft,
    VideoUrl, average_score,
};
pub use self::course_service::CourseService;
pub use self::error::{Error, ErrorCode};
pub use self::favorites_service::FavoritesService;
pub use self::session::{
    ACCESS_TOKEN_TTL, AuthenticatedSession, IssuedToken, REFRESH_TOKEN_TTL, SessionTokens,
    TokenKind,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DEFAULT_EMAIL_DOMAIN, EmailAddress, EmailPolicy, PasswordDigest, USERNAME_MAX, User, UserId,
    UserProfile, UserSummary, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use campus_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("no such course"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
