//! Driving port for account creation and login.

use async_trait::async_trait;

use crate::domain::{AuthenticatedSession, Error, LoginCredentials, Registration};

/// Driving port for registration and login.
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and open a session for it.
    ///
    /// Fails with [`crate::domain::ErrorCode::Conflict`] when the email is
    /// already registered.
    async fn register(&self, registration: Registration) -> Result<AuthenticatedSession, Error>;

    /// Check credentials and open a session.
    ///
    /// Unknown emails and wrong passwords fail identically with
    /// [`crate::domain::ErrorCode::Unauthorized`].
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthenticatedSession, Error>;
}
