//! Application settings loaded via OrthoConfig.
//!
//! Every field can come from the command line, a configuration file or a
//! `CAMPUS_`-prefixed environment variable (`CAMPUS_PORT`,
//! `CAMPUS_DATABASE_URL`, ...). Token secrets and cookie attributes are read
//! separately; see `token_settings_from_env`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use campus_backend::domain::EmailPolicy;
use campus_backend::domain::UserValidationError;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind host {value:?}: {message}")]
    InvalidHost { value: String, message: String },
    #[error("invalid email domain: {0}")]
    InvalidEmailDomain(#[from] UserValidationError),
    #[error("pool size must be at least 1")]
    EmptyPool,
}

/// Start-up settings for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAMPUS")]
pub struct AppSettings {
    /// Address to bind; defaults to all interfaces.
    pub host: Option<String>,
    /// Port to bind; defaults to 8080.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without it the server keeps everything in memory.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: Option<u32>,
    /// Institutional domain new accounts must use.
    pub email_domain: Option<String>,
    /// Apply embedded migrations before serving; defaults to `true`.
    pub run_migrations: Option<bool>,
}

impl AppSettings {
    /// Socket to bind, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = match self.host.as_deref() {
            None => DEFAULT_HOST,
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|err| SettingsError::InvalidHost {
                    value: raw.to_owned(),
                    message: err.to_string(),
                })?,
        };
        Ok(SocketAddr::new(host, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Configured URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Configured pool size, 10 when unset. Zero is rejected.
    pub fn pool_size(&self) -> Result<u32, SettingsError> {
        match self.pool_size {
            Some(0) => Err(SettingsError::EmptyPool),
            Some(size) => Ok(size),
            None => Ok(DEFAULT_POOL_SIZE),
        }
    }

    /// Whether pending migrations run before the pool is built.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Registration domain policy, `amigo.edu.co` when unset.
    pub fn email_policy(&self) -> Result<EmailPolicy, SettingsError> {
        match self.email_domain.as_deref() {
            Some(domain) => Ok(EmailPolicy::new(domain)?),
            None => Ok(EmailPolicy::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Settings parsing under controlled environments.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "CAMPUS_HOST",
        "CAMPUS_PORT",
        "CAMPUS_DATABASE_URL",
        "CAMPUS_POOL_SIZE",
        "CAMPUS_EMAIL_DOMAIN",
        "CAMPUS_RUN_MIGRATIONS",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("campus-backend")])
            .expect("settings should load")
    }

    #[rstest]
    fn defaults_bind_all_interfaces_in_memory() {
        let settings = load_with(&[]);

        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            SocketAddr::new(DEFAULT_HOST, DEFAULT_PORT)
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.pool_size().expect("pool size"), DEFAULT_POOL_SIZE);
        assert_eq!(
            settings.email_policy().expect("policy"),
            EmailPolicy::default()
        );
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("CAMPUS_HOST", "127.0.0.1"),
            ("CAMPUS_PORT", "9090"),
            ("CAMPUS_DATABASE_URL", "postgres://localhost/campus"),
            ("CAMPUS_POOL_SIZE", "4"),
            ("CAMPUS_EMAIL_DOMAIN", "Uni.Example.org"),
            ("CAMPUS_RUN_MIGRATIONS", "false"),
        ]);

        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "127.0.0.1:9090".parse::<SocketAddr>().expect("socket addr")
        );
        assert_eq!(settings.database_url(), Some("postgres://localhost/campus"));
        assert_eq!(settings.pool_size().expect("pool size"), 4);
        assert_eq!(
            settings.email_policy().expect("policy").domain(),
            "uni.example.org"
        );
        assert!(!settings.run_migrations());
    }

    #[rstest]
    #[case(&[("CAMPUS_HOST", "not-an-ip")])]
    #[case(&[("CAMPUS_POOL_SIZE", "0")])]
    #[case(&[("CAMPUS_EMAIL_DOMAIN", "@bad")])]
    fn invalid_values_are_reported(#[case] overrides: &[(&str, &str)]) {
        let settings = load_with(overrides);

        let failed = settings.bind_addr().is_err()
            || settings.pool_size().is_err()
            || settings.email_policy().is_err();
        assert!(failed);
    }

    #[rstest]
    fn database_url_alone_still_runs_migrations() {
        let settings = load_with(&[("CAMPUS_DATABASE_URL", "postgres://localhost/campus")]);

        assert_eq!(settings.database_url(), Some("postgres://localhost/campus"));
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let settings = load_with(&[("CAMPUS_DATABASE_URL", "  ")]);
        assert!(settings.database_url().is_none());
    }
}
