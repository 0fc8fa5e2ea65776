//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only ever see driving ports,
//! so they can be exercised against in-memory adapters without I/O.

use std::sync::Arc;

use crate::domain::EmailPolicy;
use crate::domain::ports::{
    AccountCommand, CourseCommand, CourseQuery, FavoritesCommand, FavoritesQuery,
    SessionValidator,
};

use super::session_cookies::CookieSettings;

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub sessions: Arc<dyn SessionValidator>,
    pub courses: Arc<dyn CourseCommand>,
    pub catalogue: Arc<dyn CourseQuery>,
    pub favorites: Arc<dyn FavoritesCommand>,
    pub favorites_query: Arc<dyn FavoritesQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub sessions: Arc<dyn SessionValidator>,
    pub courses: Arc<dyn CourseCommand>,
    pub catalogue: Arc<dyn CourseQuery>,
    pub favorites: Arc<dyn FavoritesCommand>,
    pub favorites_query: Arc<dyn FavoritesQuery>,
    /// Institutional domain registrations must belong to.
    pub email_policy: EmailPolicy,
    /// Attributes for the session cookies set on register and login.
    pub cookies: CookieSettings,
}

impl HttpState {
    /// Construct state with the default email policy and secure cookies.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            sessions,
            courses,
            catalogue,
            favorites,
            favorites_query,
        } = ports;
        Self {
            accounts,
            sessions,
            courses,
            catalogue,
            favorites,
            favorites_query,
            email_policy: EmailPolicy::default(),
            cookies: CookieSettings::default(),
        }
    }

    /// Replace the default institutional domain.
    #[must_use]
    pub fn with_email_policy(mut self, policy: EmailPolicy) -> Self {
        self.email_policy = policy;
        self
    }

    /// Replace the default cookie attributes.
    #[must_use]
    pub fn with_cookies(mut self, cookies: CookieSettings) -> Self {
        self.cookies = cookies;
        self
    }
}
