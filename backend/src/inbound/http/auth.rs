//! Bearer-token authentication as an Actix extractor.
//!
//! Handlers that take an [`AuthenticatedUser`] argument only run once the
//! request's access token has been validated; every failure is a `401`.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId, UserProfile};

use super::session_cookies::ACCESS_COOKIE;
use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// The signed-in user behind the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(UserProfile);

impl AuthenticatedUser {
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.0.id
    }

    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.0
    }

    #[must_use]
    pub fn into_profile(self) -> UserProfile {
        self.0
    }
}

/// Token presented by the client: the `Authorization: Bearer` header wins,
/// the access-token cookie is the fallback.
pub(crate) fn presented_token(req: &HttpRequest) -> Option<String> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(|token| token.trim().to_owned());
    header.or_else(|| req.cookie(ACCESS_COOKIE).map(|c| c.value().to_owned()))
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = presented_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let profile = state
                .sessions
                .validate_token(token.as_deref())
                .await
                .inspect_err(|err| warn!(code = ?err.code(), "request authentication failed"))?;
            Ok(Self(profile))
        })
    }
}
