//! Issued session credentials.

use chrono::{DateTime, Duration, Utc};

use super::UserProfile;

/// Lifetime of an access token.
pub const ACCESS_TOKEN_TTL: Duration = Duration::minutes(15);
/// Lifetime of a refresh token.
pub const REFRESH_TOKEN_TTL: Duration = Duration::days(7);

/// Which half of a session a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub const fn ttl(self) -> Duration {
        match self {
            Self::Access => ACCESS_TOKEN_TTL,
            Self::Refresh => REFRESH_TOKEN_TTL,
        }
    }
}

/// A signed token together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub kind: TokenKind,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Cookie max-age matching the token lifetime.
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.kind.ttl()
    }
}

/// Access and refresh tokens minted together for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Outcome of a successful registration or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub user: UserProfile,
    pub tokens: SessionTokens,
}
