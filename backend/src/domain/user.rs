//! User accounts and their validated building blocks.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CourseId;

/// Institutional domain accepted when no other is configured.
pub const DEFAULT_EMAIL_DOMAIN: &str = "amigo.edu.co";
/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 50;

/// Validation failures for user-facing account fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must be an address at {domain}")]
    EmailOutsideDomain { domain: String },
    #[error("email domain must be a bare host name")]
    InvalidEmailDomain,
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed, non-empty public handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Trimmed, non-empty name of at most [`USERNAME_MAX`] characters.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static LOCAL_PART_RE: OnceLock<Regex> = OnceLock::new();

fn local_part_regex() -> &'static Regex {
    LOCAL_PART_RE.get_or_init(|| {
        Regex::new("^[a-z0-9._%+-]+$")
            .unwrap_or_else(|error| panic!("email local part regex failed to compile: {error}"))
    })
}

/// Which email addresses may register.
///
/// Only addresses at exactly one institutional domain are accepted.
///
/// # Examples
/// ```
/// use campus_backend::domain::{EmailAddress, EmailPolicy};
///
/// let policy = EmailPolicy::default();
/// assert!(EmailAddress::parse("Ada.Lovelace@AMIGO.edu.co", &policy).is_ok());
/// assert!(EmailAddress::parse("ada@gmail.com", &policy).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPolicy {
    domain: String,
}

impl EmailPolicy {
    /// Policy for `domain`, lower-cased.
    pub fn new(domain: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let domain = domain.as_ref().trim().to_ascii_lowercase();
        let well_formed = !domain.is_empty()
            && !domain.contains('@')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.chars().any(char::is_whitespace);
        if !well_formed {
            return Err(UserValidationError::InvalidEmailDomain);
        }
        Ok(Self { domain })
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self {
            domain: DEFAULT_EMAIL_DOMAIN.to_owned(),
        }
    }
}

/// Normalised (trimmed, lower-cased) institutional email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate `raw` against the registration policy.
    pub fn parse(raw: &str, policy: &EmailPolicy) -> Result<Self, UserValidationError> {
        let normalised = Self::normalise(raw);
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let outside = || UserValidationError::EmailOutsideDomain {
            domain: policy.domain().to_owned(),
        };
        let (local, domain) = normalised.rsplit_once('@').ok_or_else(outside)?;
        if domain != policy.domain() || !local_part_regex().is_match(local) {
            return Err(outside());
        }
        Ok(Self(normalised))
    }

    /// Canonical lookup form used for both storage and login.
    #[must_use]
    pub fn normalise(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Rehydrate an address that was validated before it was stored.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// PHC-formatted password hash. Never serialised or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    #[must_use]
    pub fn new(phc: String) -> Self {
        Self(phc)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Registered account, including its credential hash.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_digest: PasswordDigest,
    pub favorites: Vec<CourseId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public projection without the password hash.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            favorites: self.favorites.clone(),
            created_at: self.created_at,
        }
    }

    /// Creator projection shown next to courses.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// What a user may see about themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub favorites: Vec<CourseId>,
    pub created_at: DateTime<Utc>,
}

/// What anyone may see about a course creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub username: Username,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@amigo.edu.co")]
    #[case("  Ada.Lovelace+cs@Amigo.Edu.Co ")]
    #[case("a_b%c-d@amigo.edu.co")]
    fn accepts_institutional_addresses(#[case] raw: &str) {
        let email = EmailAddress::parse(raw, &EmailPolicy::default()).expect("valid email");
        assert_eq!(email.as_str(), raw.trim().to_lowercase());
    }

    #[rstest]
    #[case("ada@gmail.com")]
    #[case("ada@amigo.edu.co.evil.com")]
    #[case("ada@sub.amigo.edu.co")]
    #[case("@amigo.edu.co")]
    #[case("ada lovelace@amigo.edu.co")]
    #[case("ada")]
    fn rejects_foreign_or_malformed_addresses(#[case] raw: &str) {
        let err = EmailAddress::parse(raw, &EmailPolicy::default()).expect_err("rejected");
        assert_eq!(
            err,
            UserValidationError::EmailOutsideDomain {
                domain: DEFAULT_EMAIL_DOMAIN.to_owned()
            }
        );
    }

    #[test]
    fn blank_email_is_reported_as_empty() {
        let err = EmailAddress::parse("   ", &EmailPolicy::default()).expect_err("rejected");
        assert_eq!(err, UserValidationError::EmptyEmail);
    }

    #[test]
    fn custom_domain_policy_applies() {
        let policy = EmailPolicy::new("Uni.Example").expect("valid domain");
        assert!(EmailAddress::parse("x@uni.example", &policy).is_ok());
        assert!(EmailAddress::parse("x@amigo.edu.co", &policy).is_err());
    }

    #[rstest]
    #[case("")]
    #[case("a@b.c")]
    #[case(".edu")]
    fn malformed_policy_domains_are_refused(#[case] raw: &str) {
        assert_eq!(
            EmailPolicy::new(raw),
            Err(UserValidationError::InvalidEmailDomain)
        );
    }

    #[test]
    fn username_is_trimmed() {
        let name = Username::new("  ada  ").expect("valid username");
        assert_eq!(name.as_str(), "ada");
    }

    #[test]
    fn username_length_is_bounded() {
        let long = "x".repeat(USERNAME_MAX + 1);
        assert_eq!(
            Username::new(long),
            Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX })
        );
    }

    #[test]
    fn password_digest_debug_is_redacted() {
        let digest = PasswordDigest::new("$argon2id$secret".to_owned());
        assert!(!format!("{digest:?}").contains("secret"));
    }
}
