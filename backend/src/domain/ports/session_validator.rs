//! Driving port resolving a bearer token to the signed-in user.

use async_trait::async_trait;

use crate::domain::{Error, UserProfile};

/// Resolves a bearer or cookie token to the signed-in user.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `None` means no token was presented at all.
    async fn validate_token(&self, token: Option<&str>) -> Result<UserProfile, Error>;
}
