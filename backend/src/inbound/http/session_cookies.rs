//! Session cookies carrying the issued tokens.

use actix_web::HttpResponseBuilder;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};

use crate::domain::{IssuedToken, SessionTokens, TokenKind};

/// Cookie holding the access token; also read by the auth extractor.
pub const ACCESS_COOKIE: &str = "access_token";
/// Cookie holding the refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Attributes applied to both session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Strict,
        }
    }
}

const fn cookie_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Access => ACCESS_COOKIE,
        TokenKind::Refresh => REFRESH_COOKIE,
    }
}

/// Build the `HttpOnly` cookie for one token, living as long as the token.
///
/// # Examples
/// ```
/// use campus_backend::domain::{IssuedToken, TokenKind};
/// use campus_backend::inbound::http::session_cookies::{CookieSettings, session_cookie};
///
/// let token = IssuedToken {
///     kind: TokenKind::Access,
///     value: "header.payload.sig".into(),
///     expires_at: chrono::Utc::now(),
/// };
/// let cookie = session_cookie(&token, CookieSettings::default());
/// assert_eq!(cookie.name(), "access_token");
/// assert_eq!(cookie.http_only(), Some(true));
/// ```
#[must_use]
pub fn session_cookie(token: &IssuedToken, settings: CookieSettings) -> Cookie<'static> {
    Cookie::build(cookie_name(token.kind), token.value.clone())
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(settings.same_site)
        .max_age(CookieDuration::seconds(token.max_age().num_seconds()))
        .finish()
}

/// Add both session cookies to a response.
pub fn attach_session_cookies(
    builder: &mut HttpResponseBuilder,
    tokens: &SessionTokens,
    settings: CookieSettings,
) {
    builder.cookie(session_cookie(&tokens.access, settings));
    builder.cookie(session_cookie(&tokens.refresh, settings));
}
