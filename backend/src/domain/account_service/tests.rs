//! Tests for the account service.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockPasswordHasher, MockSessionTokenCodec, MockUserRepository};
use crate::domain::{
    EmailAddress, EmailPolicy, ErrorCode, IssuedToken, TokenKind, Username,
};
use crate::test_support::MutableClock;

type Service = AccountService<MockUserRepository, MockPasswordHasher, MockSessionTokenCodec>;

const EMAIL: &str = "ada@amigo.edu.co";
const PASSWORD: &str = "Str0ng!pw";
const DIGEST: &str = "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA";

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn make_service(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockSessionTokenCodec,
) -> Service {
    AccountService::new(
        Arc::new(users),
        Arc::new(hasher),
        Arc::new(tokens),
        Arc::new(MutableClock::new(now())),
    )
}

fn stored_user(id: UserId) -> User {
    User {
        id,
        username: Username::new("ada").expect("username"),
        email: EmailAddress::parse(EMAIL, &EmailPolicy::default()).expect("email"),
        password_digest: PasswordDigest::new(DIGEST.to_owned()),
        favorites: Vec::new(),
        created_at: now(),
    }
}

fn tokens_for(user: &UserId) -> SessionTokens {
    SessionTokens {
        access: IssuedToken {
            kind: TokenKind::Access,
            value: format!("access-{user}"),
            expires_at: now() + Duration::minutes(15),
        },
        refresh: IssuedToken {
            kind: TokenKind::Refresh,
            value: format!("refresh-{user}"),
            expires_at: now() + Duration::days(7),
        },
    }
}

fn issuing_codec() -> MockSessionTokenCodec {
    let mut tokens = MockSessionTokenCodec::new();
    tokens.expect_issue().returning(|user| Ok(tokens_for(user)));
    tokens
}

#[fixture]
fn registration() -> Registration {
    Registration::try_from_parts("ada", EMAIL, PASSWORD, &EmailPolicy::default())
        .expect("valid registration")
}

#[rstest]
#[tokio::test]
async fn register_hashes_password_and_opens_session(registration: Registration) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .with(eq(EMAIL))
        .times(1)
        .return_once(|_| Ok(None));
    users
        .expect_insert()
        .withf(|user| user.password_digest.as_str() == DIGEST && user.created_at == now())
        .times(1)
        .return_once(|_| Ok(()));

    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|plaintext| plaintext == PASSWORD)
        .times(1)
        .return_once(|_| Ok(PasswordDigest::new(DIGEST.to_owned())));

    let service = make_service(users, hasher, issuing_codec());
    let session = service.register(registration).await.expect("registered");

    assert_eq!(session.user.email.as_str(), EMAIL);
    assert_eq!(session.user.username.as_str(), "ada");
    assert_eq!(session.tokens, tokens_for(&session.user.id));
}

#[rstest]
#[tokio::test]
async fn register_rejects_known_email_without_hashing(registration: Registration) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(|_| Ok(Some(stored_user(UserId::random()))));
    users.expect_insert().never();
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().never();

    let service = make_service(users, hasher, MockSessionTokenCodec::new());
    let error = service.register(registration).await.expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "email already registered");
}

#[rstest]
#[tokio::test]
async fn register_maps_insert_race_to_conflict(registration: Registration) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users
        .expect_insert()
        .return_once(|_| Err(UserPersistenceError::duplicate_email(EMAIL)));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordDigest::new(DIGEST.to_owned())));
    let mut tokens = MockSessionTokenCodec::new();
    tokens.expect_issue().never();

    let service = make_service(users, hasher, tokens);
    let error = service.register(registration).await.expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn register_surfaces_unreachable_store(registration: Registration) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(|_| Err(UserPersistenceError::connection("refused")));

    let service = make_service(users, MockPasswordHasher::new(), MockSessionTokenCodec::new());
    let error = service.register(registration).await.expect_err("unavailable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn login_opens_session_for_matching_password() {
    let id = UserId::random();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .with(eq(EMAIL))
        .return_once(move |_| Ok(Some(stored_user(id))));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .withf(|plaintext, digest| plaintext == PASSWORD && digest.as_str() == DIGEST)
        .return_once(|_, _| Ok(true));

    let service = make_service(users, hasher, issuing_codec());
    let credentials = LoginCredentials::try_from_parts(" ADA@amigo.edu.co ", PASSWORD)
        .expect("credentials");
    let session = service.login(credentials).await.expect("logged in");

    assert_eq!(session.user.id, id);
    assert_eq!(session.tokens, tokens_for(&id));
}

#[rstest]
#[case::unknown_email(false, false)]
#[case::wrong_password(true, false)]
#[tokio::test]
async fn login_failures_are_indistinguishable(#[case] known: bool, #[case] verifies: bool) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(move |_| {
        Ok(known.then(|| stored_user(UserId::random())))
    });
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().returning(move |_, _| Ok(verifies));
    let mut tokens = MockSessionTokenCodec::new();
    tokens.expect_issue().never();

    let service = make_service(users, hasher, tokens);
    let credentials = LoginCredentials::try_from_parts(EMAIL, "Wr0ng!pw").expect("credentials");
    let error = service.login(credentials).await.expect_err("rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid credentials");
}

#[tokio::test]
async fn login_reports_corrupt_digest_as_internal() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(|_| Ok(Some(stored_user(UserId::random()))));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .return_once(|_, _| Err(PasswordHashError::malformed_digest("bad phc")));

    let service = make_service(users, hasher, MockSessionTokenCodec::new());
    let credentials = LoginCredentials::try_from_parts(EMAIL, PASSWORD).expect("credentials");
    let error = service.login(credentials).await.expect_err("internal");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("   "))]
#[tokio::test]
async fn validate_requires_a_token(#[case] token: Option<&str>) {
    let mut tokens = MockSessionTokenCodec::new();
    tokens.expect_verify_access().never();
    let service = make_service(MockUserRepository::new(), MockPasswordHasher::new(), tokens);

    let error = service.validate_token(token).await.expect_err("missing");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "missing token");
}

#[rstest]
#[case(SessionTokenError::invalid("signature mismatch"))]
#[case(SessionTokenError::expired())]
#[tokio::test]
async fn validate_rejects_bad_tokens(#[case] failure: SessionTokenError) {
    let mut tokens = MockSessionTokenCodec::new();
    tokens
        .expect_verify_access()
        .return_once(move |_| Err(failure));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().never();
    let service = make_service(users, MockPasswordHasher::new(), tokens);

    let error = service
        .validate_token(Some("tampered"))
        .await
        .expect_err("invalid");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid token");
}

#[tokio::test]
async fn validate_returns_profile_of_subject() {
    let id = UserId::random();
    let mut tokens = MockSessionTokenCodec::new();
    tokens
        .expect_verify_access()
        .with(eq("good-token"))
        .return_once(move |_| Ok(id));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .with(eq(id))
        .return_once(move |_| Ok(Some(stored_user(id))));
    let service = make_service(users, MockPasswordHasher::new(), tokens);

    let profile = service
        .validate_token(Some(" good-token "))
        .await
        .expect("valid");

    assert_eq!(profile.id, id);
    assert_eq!(profile.email.as_str(), EMAIL);
}

#[tokio::test]
async fn validate_reports_vanished_subject() {
    let mut tokens = MockSessionTokenCodec::new();
    tokens
        .expect_verify_access()
        .return_once(|_| Ok(UserId::random()));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));
    let service = make_service(users, MockPasswordHasher::new(), tokens);

    let error = service
        .validate_token(Some("orphan"))
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}
