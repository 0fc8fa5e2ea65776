//! Credential inputs: registration payloads, login payloads and the password
//! policy.
//!
//! Constructors validate raw strings so handlers can reject bad input before
//! any port is called. Plaintext passwords live in [`Zeroizing`] buffers.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, EmailPolicy, UserValidationError, Username};

/// Minimum password length in characters.
pub const PASSWORD_MIN_LEN: usize = 8;
/// Symbols accepted (and one required) by the password policy.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

/// Reasons a password fails the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyViolation {
    #[error("password must be at least {min} characters", min = PASSWORD_MIN_LEN)]
    TooShort,
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    #[error("password must contain a lowercase letter")]
    MissingLowercase,
    #[error("password must contain a digit")]
    MissingDigit,
    #[error("password must contain one of {symbols}", symbols = PASSWORD_SYMBOLS)]
    MissingSymbol,
    #[error("password may only contain letters, digits and {symbols}", symbols = PASSWORD_SYMBOLS)]
    DisallowedCharacter,
}

impl PasswordPolicyViolation {
    /// Stable identifier for error details.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TooShort => "too_short",
            Self::MissingUppercase => "missing_uppercase",
            Self::MissingLowercase => "missing_lowercase",
            Self::MissingDigit => "missing_digit",
            Self::MissingSymbol => "missing_symbol",
            Self::DisallowedCharacter => "disallowed_character",
        }
    }
}

/// Plaintext password that satisfies the registration policy.
///
/// # Examples
/// ```
/// use campus_backend::domain::{Password, PasswordPolicyViolation};
///
/// assert!(Password::new("Str0ng!pw").is_ok());
/// assert_eq!(
///     Password::new("weakpass1!").unwrap_err(),
///     PasswordPolicyViolation::MissingUppercase,
/// );
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(raw: &str) -> Result<Self, PasswordPolicyViolation> {
        if !raw.chars().all(is_allowed) {
            return Err(PasswordPolicyViolation::DisallowedCharacter);
        }
        if raw.chars().count() < PASSWORD_MIN_LEN {
            return Err(PasswordPolicyViolation::TooShort);
        }
        if !raw.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(PasswordPolicyViolation::MissingUppercase);
        }
        if !raw.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(PasswordPolicyViolation::MissingLowercase);
        }
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyViolation::MissingDigit);
        }
        if !raw.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
            return Err(PasswordPolicyViolation::MissingSymbol);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c)
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Field a registration failed on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error(transparent)]
    Account(#[from] UserValidationError),
    #[error("password must not be empty")]
    EmptyPassword,
    #[error(transparent)]
    WeakPassword(#[from] PasswordPolicyViolation),
}

impl RegistrationValidationError {
    /// Name of the offending request field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Account(
                UserValidationError::EmptyUsername | UserValidationError::UsernameTooLong { .. },
            ) => "username",
            Self::Account(_) => "email",
            Self::EmptyPassword | Self::WeakPassword(_) => "password",
        }
    }
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    email: EmailAddress,
    password: Password,
}

impl Registration {
    /// Validate the three registration fields in request order.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
        policy: &EmailPolicy,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username)?;
        let email = EmailAddress::parse(email, policy)?;
        if password.is_empty() {
            return Err(RegistrationValidationError::EmptyPassword);
        }
        let password = Password::new(password)?;
        Ok(Self {
            username,
            email,
            password,
        })
    }

    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Login payload errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// The email is normalised for lookup but deliberately not checked against the
/// registration policy: an unknown address fails the same way as a wrong
/// password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Both fields must be present; the email is normalised but its domain is
    /// not checked.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::normalise(email);
        if email.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
