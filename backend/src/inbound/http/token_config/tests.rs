//! Unit tests for token configuration parsing.

use super::*;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;
use std::io::Write as _;
use tempfile::NamedTempFile;

fn secret_file(byte: u8, len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(&vec![byte; len]).expect("write secret");
    file
}

fn path_of(file: &NamedTempFile) -> String {
    file.path().to_str().expect("utf-8 temp path").to_owned()
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

struct ReleaseFixture {
    access: NamedTempFile,
    refresh: NamedTempFile,
    vars: HashMap<&'static str, String>,
}

fn release_fixture() -> ReleaseFixture {
    let access = secret_file(b'a', TOKEN_SECRET_MIN_LEN);
    let refresh = secret_file(b'r', TOKEN_SECRET_MIN_LEN);
    let vars = HashMap::from([
        (ACCESS_SECRET_FILE_ENV, path_of(&access)),
        (REFRESH_SECRET_FILE_ENV, path_of(&refresh)),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ]);
    ReleaseFixture {
        access,
        refresh,
        vars,
    }
}

#[test]
fn release_accepts_complete_configuration() {
    let fixture = release_fixture();
    let env = mock_env(fixture.vars.clone());

    let settings = token_settings_from_env(&env, BuildMode::Release).expect("valid settings");

    assert_eq!(*settings.access_secret, vec![b'a'; TOKEN_SECRET_MIN_LEN]);
    assert_eq!(*settings.refresh_secret, vec![b'r'; TOKEN_SECRET_MIN_LEN]);
    assert!(settings.cookies.secure);
    assert_eq!(settings.cookies.same_site, SameSite::Strict);
    drop((fixture.access, fixture.refresh));
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(#[case] missing: &'static str) {
    let mut fixture = release_fixture();
    fixture.vars.remove(missing);
    let env = mock_env(fixture.vars.clone());

    let err = token_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("missing toggle rejected");

    assert!(matches!(err, TokenConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
#[case("maybe")]
#[case("")]
fn release_rejects_unparsable_cookie_secure(#[case] value: &str) {
    let mut fixture = release_fixture();
    fixture.vars.insert(COOKIE_SECURE_ENV, value.to_owned());
    let env = mock_env(fixture.vars.clone());

    let err = token_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("invalid toggle rejected");

    assert!(matches!(
        err,
        TokenConfigError::InvalidEnv {
            name: COOKIE_SECURE_ENV,
            ..
        }
    ));
}

#[test]
fn release_rejects_short_secret() {
    let mut fixture = release_fixture();
    let short = secret_file(b's', TOKEN_SECRET_MIN_LEN - 1);
    fixture.vars.insert(ACCESS_SECRET_FILE_ENV, path_of(&short));
    let env = mock_env(fixture.vars.clone());

    let err = token_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("short secret rejected");

    assert!(matches!(
        err,
        TokenConfigError::SecretTooShort { length, .. } if length == TOKEN_SECRET_MIN_LEN - 1
    ));
}

#[test]
fn release_rejects_shared_secret() {
    let mut fixture = release_fixture();
    let access_path = path_of(&fixture.access);
    fixture.vars.insert(REFRESH_SECRET_FILE_ENV, access_path);
    let env = mock_env(fixture.vars.clone());

    let err = token_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("shared secret rejected");

    assert!(matches!(err, TokenConfigError::SharedSecret));
}

#[test]
fn release_rejects_missing_secret_file() {
    let mut fixture = release_fixture();
    fixture
        .vars
        .insert(REFRESH_SECRET_FILE_ENV, "/nonexistent/refresh".to_owned());
    let env = mock_env(fixture.vars.clone());

    let err = token_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("unreadable secret rejected");

    assert!(matches!(err, TokenConfigError::SecretRead { .. }));
}

#[test]
fn release_forbids_ephemeral_secrets() {
    let mut fixture = release_fixture();
    fixture.vars.insert(ALLOW_EPHEMERAL_ENV, "1".to_owned());
    let env = mock_env(fixture.vars.clone());

    let err = token_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("ephemeral rejected");

    assert!(matches!(err, TokenConfigError::EphemeralNotAllowed));
}

#[test]
fn release_same_site_none_needs_secure_cookies() {
    let mut fixture = release_fixture();
    fixture.vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    fixture.vars.insert(SAMESITE_ENV, "None".to_owned());
    let env = mock_env(fixture.vars.clone());

    let err = token_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("insecure SameSite=None rejected");

    assert!(matches!(err, TokenConfigError::InsecureSameSiteNone));
}

#[test]
fn debug_falls_back_to_ephemeral_distinct_secrets() {
    let env = mock_env(HashMap::from([
        (ACCESS_SECRET_FILE_ENV, "/nonexistent/access".to_owned()),
        (REFRESH_SECRET_FILE_ENV, "/nonexistent/refresh".to_owned()),
    ]));

    let settings = token_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");

    assert_eq!(settings.access_secret.len(), 64);
    assert_ne!(*settings.access_secret, *settings.refresh_secret);
    assert!(settings.cookies.secure);
    assert_eq!(settings.cookies.same_site, SameSite::Lax);
}

#[rstest]
#[case("lax", SameSite::Lax)]
#[case("STRICT", SameSite::Strict)]
#[case("bogus", SameSite::Lax)]
fn debug_same_site_parsing(#[case] raw: &str, #[case] expected: SameSite) {
    let env = mock_env(HashMap::from([
        (SAMESITE_ENV, raw.to_owned()),
        (ACCESS_SECRET_FILE_ENV, "/nonexistent/access".to_owned()),
        (REFRESH_SECRET_FILE_ENV, "/nonexistent/refresh".to_owned()),
    ]));

    let settings = token_settings_from_env(&env, BuildMode::Debug).expect("debug settings");

    assert_eq!(settings.cookies.same_site, expected);
}

#[test]
fn debug_can_disable_secure_cookies_for_local_http() {
    let env = mock_env(HashMap::from([
        (COOKIE_SECURE_ENV, "no".to_owned()),
        (ACCESS_SECRET_FILE_ENV, "/nonexistent/access".to_owned()),
        (REFRESH_SECRET_FILE_ENV, "/nonexistent/refresh".to_owned()),
    ]));

    let settings = token_settings_from_env(&env, BuildMode::Debug).expect("debug settings");

    assert!(!settings.cookies.secure);
}
