//! Registration, login and token validation.
//!
//! Password hashing runs on tokio's blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AccountCommand, PasswordHashError, PasswordHasher, SessionTokenCodec, SessionTokenError,
    SessionValidator, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AuthenticatedSession, Error, LoginCredentials, PasswordDigest, Registration, SessionTokens,
    User, UserId, UserProfile,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account use-cases over a user store, a password hasher and a token codec.
pub struct AccountService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, H, T> AccountService<U, H, T> {
    /// Service over the given user store, hasher and token codec.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }
}

impl<U, H, T> AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: SessionTokenCodec,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { .. } => Self::email_taken(),
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(error.to_string())
    }

    fn email_taken() -> Error {
        Error::conflict("email already registered")
            .with_details(json!({ "field": "email", "code": "duplicate_email" }))
    }

    /// Run CPU-heavy hashing on the blocking pool.
    async fn run_hasher<R, F>(&self, work: F) -> Result<R, Error>
    where
        F: FnOnce(&H) -> Result<R, PasswordHashError> + Send + 'static,
        R: Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || work(&hasher))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(Self::map_hash_error)
    }

    fn issue_tokens(&self, user: &UserId) -> Result<SessionTokens, Error> {
        self.tokens.issue(user).map_err(|err| {
            Error::internal(format!("failed to issue session tokens: {err}"))
        })
    }
}

#[async_trait]
impl<U, H, T> AccountCommand for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: SessionTokenCodec,
{
    async fn register(&self, registration: Registration) -> Result<AuthenticatedSession, Error> {
        let existing = self
            .users
            .find_by_email(registration.email().as_str())
            .await
            .map_err(Self::map_user_error)?;
        if existing.is_some() {
            return Err(Self::email_taken());
        }

        let password = registration.password().clone();
        let digest: PasswordDigest = self
            .run_hasher(move |hasher| hasher.hash(password.expose()))
            .await?;

        let user = User {
            id: UserId::random(),
            username: registration.username().clone(),
            email: registration.email().clone(),
            password_digest: digest,
            favorites: Vec::new(),
            created_at: self.clock.utc(),
        };
        self.users
            .insert(&user)
            .await
            .map_err(Self::map_user_error)?;

        let tokens = self.issue_tokens(&user.id)?;
        info!(user_id = %user.id, "account registered");
        Ok(AuthenticatedSession {
            user: user.profile(),
            tokens,
        })
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthenticatedSession, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(Self::map_user_error)?
        else {
            warn!("login rejected: unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let digest = user.password_digest.clone();
        let matches = self
            .run_hasher(move |hasher| hasher.verify(credentials.password(), &digest))
            .await?;
        if !matches {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let tokens = self.issue_tokens(&user.id)?;
        info!(user_id = %user.id, "login succeeded");
        Ok(AuthenticatedSession {
            user: user.profile(),
            tokens,
        })
    }
}

#[async_trait]
impl<U, H, T> SessionValidator for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: SessionTokenCodec,
{
    async fn validate_token(&self, token: Option<&str>) -> Result<UserProfile, Error> {
        let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
            return Err(Error::unauthorized("missing token"));
        };

        let user_id = self.tokens.verify_access(token).map_err(|err| match err {
            SessionTokenError::Invalid { .. } | SessionTokenError::Expired => {
                debug!(reason = %err, "access token rejected");
                Error::unauthorized("invalid token")
            }
            SessionTokenError::Signing { message } => Error::internal(message),
        })?;

        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        Ok(user.profile())
    }
}

#[cfg(test)]
mod tests;
