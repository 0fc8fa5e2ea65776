//! Driven port for one-way password hashing.

use crate::domain::PasswordDigest;

use super::define_port_error;

define_port_error! {
    /// Failures raised while hashing or checking passwords.
    pub enum PasswordHashError {
        /// The hashing primitive itself failed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// A stored digest could not be parsed.
        MalformedDigest { message: String } => "stored password digest is malformed: {message}",
    }
}

/// Salted, slow password hashing.
///
/// Implementations are CPU-bound and synchronous; a wrong password is
/// `Ok(false)`, not an error.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<PasswordDigest, PasswordHashError>;

    fn verify(&self, plaintext: &str, digest: &PasswordDigest) -> Result<bool, PasswordHashError>;
}

