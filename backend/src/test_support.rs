//! Shared test doubles.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration tests under `tests/`.

use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::cookie::SameSite;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{AccountService, CourseService, FavoritesService};
use crate::inbound::http::session_cookies::CookieSettings;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryCourseRepository, InMemoryUserRepository};
use crate::outbound::security::{Argon2PasswordHasher, JwtSessionTokens, SigningSecret};

/// Clock frozen at a chosen instant that tests move forward by hand.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// # Panics
    /// Panics if a previous holder of the clock lock panicked.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex poisoned"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed starting instant for deterministic tests.
///
/// # Panics
/// Never in practice; the constant date is valid in UTC.
pub fn test_epoch() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).single() {
        Some(instant) => instant,
        None => panic!("test epoch is a valid timestamp"),
    }
}

/// Every adapter wired in memory, with handles for seeding and time travel.
pub struct MemoryBackend {
    pub state: HttpState,
    pub users: Arc<InMemoryUserRepository>,
    pub courses: Arc<InMemoryCourseRepository>,
    pub clock: Arc<MutableClock>,
}

impl MemoryBackend {
    /// In-memory users and courses, minimum-cost Argon2 and fixed HS256
    /// secrets. Cookies are not marked `Secure` so plain HTTP tests see them.
    ///
    /// # Panics
    /// Panics if Argon2 rejects its minimum cost parameters.
    pub fn new() -> Self {
        let clock = Arc::new(MutableClock::new(test_epoch()));
        let users = Arc::new(InMemoryUserRepository::new());
        let courses = Arc::new(InMemoryCourseRepository::new());
        let hasher = match Argon2PasswordHasher::fast() {
            Ok(hasher) => Arc::new(hasher),
            Err(err) => panic!("minimum argon2 parameters rejected: {err}"),
        };
        let tokens = Arc::new(JwtSessionTokens::new(
            SigningSecret::new(vec![0x11; 32]),
            SigningSecret::new(vec![0x22; 32]),
            clock.clone(),
        ));

        let accounts = Arc::new(AccountService::new(
            users.clone(),
            hasher,
            tokens,
            clock.clone(),
        ));
        let catalogue = Arc::new(CourseService::new(
            courses.clone(),
            users.clone(),
            clock.clone(),
        ));
        let favorites = Arc::new(FavoritesService::new(courses.clone(), users.clone()));

        let state = HttpState::new(HttpStatePorts {
            accounts: accounts.clone(),
            sessions: accounts,
            courses: catalogue.clone(),
            catalogue,
            favorites: favorites.clone(),
            favorites_query: favorites,
        })
        .with_cookies(CookieSettings {
            secure: false,
            same_site: SameSite::Lax,
        });

        Self {
            state,
            users,
            courses,
            clock,
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}
