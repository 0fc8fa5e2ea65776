//! Driven port for minting and checking signed session tokens.

use crate::domain::{SessionTokens, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised by token codecs.
    pub enum SessionTokenError {
        /// Signature, structure or algorithm did not check out.
        Invalid { reason: String } => "invalid token: {reason}",
        /// The token was well-formed but past its expiry.
        Expired => "token expired",
        /// Signing a fresh token failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Issues access/refresh pairs and verifies access tokens.
#[cfg_attr(test, mockall::automock)]
pub trait SessionTokenCodec: Send + Sync {
    fn issue(&self, user: &UserId) -> Result<SessionTokens, SessionTokenError>;

    /// The subject of a valid, unexpired access token.
    fn verify_access(&self, token: &str) -> Result<UserId, SessionTokenError>;
}
