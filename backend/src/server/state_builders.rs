//! Wiring of domain services onto the configured adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use campus_backend::domain::ports::{CourseRepository, UserRepository};
use campus_backend::domain::{AccountService, CourseService, FavoritesService};
use campus_backend::inbound::http::state::{HttpState, HttpStatePorts};
use campus_backend::inbound::http::token_config::TokenSettings;
use campus_backend::outbound::memory::{InMemoryCourseRepository, InMemoryUserRepository};
use campus_backend::outbound::persistence::{DieselCourseRepository, DieselUserRepository};
use campus_backend::outbound::security::{Argon2PasswordHasher, JwtSessionTokens, SigningSecret};

use super::ServerConfig;

fn session_codec(tokens: &TokenSettings, clock: Arc<dyn Clock>) -> JwtSessionTokens {
    JwtSessionTokens::new(
        SigningSecret::new(tokens.access_secret.to_vec()),
        SigningSecret::new(tokens.refresh_secret.to_vec()),
        clock,
    )
}

/// Build every driving port over one pair of repositories.
fn wire_ports<U, C>(
    users: Arc<U>,
    courses: Arc<C>,
    tokens: Arc<JwtSessionTokens>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    C: CourseRepository + 'static,
{
    let accounts = Arc::new(AccountService::new(
        Arc::clone(&users),
        Arc::new(Argon2PasswordHasher::default()),
        tokens,
        Arc::clone(&clock),
    ));
    let catalogue = Arc::new(CourseService::new(
        Arc::clone(&courses),
        Arc::clone(&users),
        clock,
    ));
    let favorites = Arc::new(FavoritesService::new(courses, users));

    HttpStatePorts {
        accounts: accounts.clone(),
        sessions: accounts,
        courses: catalogue.clone(),
        catalogue,
        favorites: favorites.clone(),
        favorites_query: favorites,
    }
}

/// Construct the handler state for `config`.
///
/// Diesel repositories are used when a pool is configured; otherwise data
/// lives in process memory and is lost on restart.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = Arc::new(session_codec(&config.tokens, Arc::clone(&clock)));

    let ports = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            wire_ports(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselCourseRepository::new(pool.clone())),
                tokens,
                clock,
            )
        }
        None => {
            warn!("no database configured; accounts and courses are kept in memory");
            wire_ports(
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryCourseRepository::new()),
                tokens,
                clock,
            )
        }
    };

    web::Data::new(
        HttpState::new(ports)
            .with_email_policy(config.email_policy.clone())
            .with_cookies(config.tokens.cookies),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::SameSite;
    use campus_backend::domain::EmailPolicy;
    use campus_backend::inbound::http::session_cookies::CookieSettings;
    use zeroize::Zeroizing;

    fn settings() -> TokenSettings {
        TokenSettings {
            access_secret: Zeroizing::new(vec![0x41; 32]),
            refresh_secret: Zeroizing::new(vec![0x42; 32]),
            cookies: CookieSettings {
                secure: false,
                same_site: SameSite::Lax,
            },
        }
    }

    #[test]
    fn in_memory_state_carries_configured_policy_and_cookies() {
        let policy = EmailPolicy::new("uni.example.org").expect("policy");
        let config = ServerConfig::new(
            settings(),
            policy.clone(),
            "127.0.0.1:0".parse().expect("addr"),
        );

        let state = build_http_state(&config);

        assert_eq!(state.email_policy, policy);
        assert!(!state.cookies.secure);
        assert_eq!(state.cookies.same_site, SameSite::Lax);
    }

    #[tokio::test]
    async fn in_memory_state_validates_tokens_it_issued() {
        let config = ServerConfig::new(
            settings(),
            EmailPolicy::default(),
            "127.0.0.1:0".parse().expect("addr"),
        );
        let state = build_http_state(&config);

        let error = state
            .sessions
            .validate_token(Some("not-a-token"))
            .await
            .expect_err("garbage token rejected");
        assert_eq!(error.message(), "invalid token");
    }
}
