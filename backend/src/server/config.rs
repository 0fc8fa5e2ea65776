//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use campus_backend::domain::EmailPolicy;
use campus_backend::inbound::http::token_config::TokenSettings;
use campus_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) tokens: TokenSettings,
    pub(crate) email_policy: EmailPolicy,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a configuration that keeps all data in memory.
    #[must_use]
    pub fn new(tokens: TokenSettings, email_policy: EmailPolicy, bind_addr: SocketAddr) -> Self {
        Self {
            tokens,
            email_policy,
            bind_addr,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
