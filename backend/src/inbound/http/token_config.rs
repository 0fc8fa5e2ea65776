//! Token secret and cookie settings read from the environment.
//!
//! Debug builds fall back to secure defaults and ephemeral secrets with a
//! warning; release builds require every toggle to be set explicitly and both
//! secrets to be present, long enough and distinct.

use std::path::PathBuf;

use actix_web::cookie::SameSite;
use argon2::password_hash::rand_core::{OsRng, RngCore as _};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

use super::session_cookies::CookieSettings;

pub(crate) const ACCESS_SECRET_FILE_ENV: &str = "ACCESS_TOKEN_SECRET_FILE";
pub(crate) const REFRESH_SECRET_FILE_ENV: &str = "REFRESH_TOKEN_SECRET_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const ACCESS_SECRET_DEFAULT_PATH: &str = "/var/run/secrets/access_token_secret";
const REFRESH_SECRET_DEFAULT_PATH: &str = "/var/run/secrets/refresh_token_secret";
/// Minimum HS256 secret length accepted in release builds.
pub const TOKEN_SECRET_MIN_LEN: usize = 32;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Defaults and warnings for anything missing.
    Debug,
    /// Every setting must be explicit and valid.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// ```
    /// use campus_backend::inbound::http::token_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated token and cookie settings.
pub struct TokenSettings {
    /// HMAC secret for access tokens.
    pub access_secret: Zeroizing<Vec<u8>>,
    /// HMAC secret for refresh tokens.
    pub refresh_secret: Zeroizing<Vec<u8>>,
    /// Attributes for the session cookies.
    pub cookies: CookieSettings,
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token secret at {path} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("access and refresh tokens must use different secrets")]
    SharedSecret,
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use campus_backend::inbound::http::token_config::{BuildMode, token_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// // Debug builds tolerate a bare environment.
/// let settings = token_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookies.secure);
/// assert_ne!(*settings.access_secret, *settings.refresh_secret);
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, TokenConfigError> {
    let secure = cookie_secure_from_env(env, mode)?;
    let same_site = same_site_from_env(env, mode, secure)?;
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let access_secret = secret_from_env(
        env,
        mode,
        allow_ephemeral,
        ACCESS_SECRET_FILE_ENV,
        ACCESS_SECRET_DEFAULT_PATH,
    )?;
    let refresh_secret = secret_from_env(
        env,
        mode,
        allow_ephemeral,
        REFRESH_SECRET_FILE_ENV,
        REFRESH_SECRET_DEFAULT_PATH,
    )?;
    if *access_secret == *refresh_secret {
        return Err(TokenConfigError::SharedSecret);
    }

    Ok(TokenSettings {
        access_secret,
        refresh_secret,
        cookies: CookieSettings { secure, same_site },
    })
}

fn cookie_secure_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(COOKIE_SECURE_ENV) else {
        if mode.is_debug() {
            warn!("SESSION_COOKIE_SECURE not set; defaulting to secure");
            return Ok(true);
        }
        return Err(TokenConfigError::MissingEnv {
            name: COOKIE_SECURE_ENV,
        });
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid SESSION_COOKIE_SECURE; defaulting to secure");
            Ok(true)
        }
        None => Err(TokenConfigError::InvalidEnv {
            name: COOKIE_SECURE_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, TokenConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };

    let Some(value) = env.string(SAMESITE_ENV) else {
        if mode.is_debug() {
            warn!("SESSION_SAMESITE not set; using default");
            return Ok(default_same_site);
        }
        return Err(TokenConfigError::MissingEnv { name: SAMESITE_ENV });
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("SESSION_SAMESITE=None without secure cookies; browsers may reject them");
            Ok(SameSite::None)
        }
        "none" => Err(TokenConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid SESSION_SAMESITE, using default");
            Ok(default_same_site)
        }
        _ => Err(TokenConfigError::InvalidEnv {
            name: SAMESITE_ENV,
            value,
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        if mode.is_debug() {
            return Ok(true);
        }
        return Err(TokenConfigError::MissingEnv {
            name: ALLOW_EPHEMERAL_ENV,
        });
    };
    match (parse_bool(&value), mode) {
        (Some(true), BuildMode::Debug) => Ok(true),
        (Some(true), BuildMode::Release) => Err(TokenConfigError::EphemeralNotAllowed),
        (Some(false), _) => Ok(false),
        (None, BuildMode::Debug) => {
            warn!(value = %value, "invalid SESSION_ALLOW_EPHEMERAL; defaulting to enabled");
            Ok(true)
        }
        (None, BuildMode::Release) => Err(TokenConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
    name: &'static str,
    default_path: &str,
) -> Result<Zeroizing<Vec<u8>>, TokenConfigError> {
    let path = PathBuf::from(env.string(name).unwrap_or_else(|| default_path.to_owned()));

    match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            let length = bytes.len();
            if mode == BuildMode::Release && length < TOKEN_SECRET_MIN_LEN {
                return Err(TokenConfigError::SecretTooShort {
                    path,
                    length,
                    min_len: TOKEN_SECRET_MIN_LEN,
                });
            }
            Ok(bytes)
        }
        Err(error) if allow_ephemeral => {
            warn!(
                variable = name,
                path = %path.display(),
                error = %error,
                "using temporary token secret (dev only)"
            );
            Ok(ephemeral_secret())
        }
        Err(error) => Err(TokenConfigError::SecretRead {
            path,
            source: error,
        }),
    }
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0_u8; 64]);
    OsRng.fill_bytes(&mut bytes);
    bytes
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
