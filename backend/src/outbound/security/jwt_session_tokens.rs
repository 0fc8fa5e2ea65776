//! HS256 `SessionTokenCodec`.
//!
//! Access and refresh tokens are signed with separate secrets, so neither can
//! stand in for the other. Expiry is checked against the injected clock rather
//! than the library's wall-clock check.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{SessionTokenCodec, SessionTokenError};
use crate::domain::{IssuedToken, SessionTokens, TokenKind, UserId};

/// HMAC key material. Wiped on drop and never printed.
#[derive(Clone)]
pub struct SigningSecret(Zeroizing<Vec<u8>>);

impl SigningSecret {
    /// Wrap raw key bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret(<{} bytes>)", self.0.len())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
    jti: Uuid,
    typ: String,
}

const fn kind_label(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Access => "access",
        TokenKind::Refresh => "refresh",
    }
}

/// HS256 codec for access and refresh tokens.
///
/// Each kind has its own secret and a `typ` claim, so a refresh token never
/// verifies as an access token. Expiry is judged against the injected clock
/// rather than the system time.
pub struct JwtSessionTokens {
    access: SigningSecret,
    refresh: SigningSecret,
    clock: Arc<dyn Clock>,
}

impl JwtSessionTokens {
    /// Codec signing access tokens with `access` and refresh tokens with
    /// `refresh`.
    pub fn new(access: SigningSecret, refresh: SigningSecret, clock: Arc<dyn Clock>) -> Self {
        Self {
            access,
            refresh,
            clock,
        }
    }

    const fn secret(&self, kind: TokenKind) -> &SigningSecret {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn sign(
        &self,
        kind: TokenKind,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, SessionTokenError> {
        let expires_at = now + kind.ttl();
        let claims = Claims {
            sub: *user.as_uuid(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            typ: kind_label(kind).to_owned(),
        };
        let value = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret(kind).as_bytes()),
        )
        .map_err(|err| SessionTokenError::signing(err.to_string()))?;
        Ok(IssuedToken {
            kind,
            value,
            expires_at,
        })
    }

    fn verify(&self, kind: TokenKind, token: &str) -> Result<UserId, SessionTokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret(kind).as_bytes()),
            &validation,
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => SessionTokenError::expired(),
            _ => SessionTokenError::invalid(err.to_string()),
        })?;

        let claims = data.claims;
        if claims.typ != kind_label(kind) {
            return Err(SessionTokenError::invalid("unexpected token type"));
        }
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(SessionTokenError::expired());
        }
        Ok(UserId::from_uuid(claims.sub))
    }
}

impl SessionTokenCodec for JwtSessionTokens {
    fn issue(&self, user: &UserId) -> Result<SessionTokens, SessionTokenError> {
        let now = self.clock.utc();
        Ok(SessionTokens {
            access: self.sign(TokenKind::Access, user, now)?,
            refresh: self.sign(TokenKind::Refresh, user, now)?,
        })
    }

    fn verify_access(&self, token: &str) -> Result<UserId, SessionTokenError> {
        self.verify(TokenKind::Access, token)
    }
}
