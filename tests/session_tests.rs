use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, Method, Request, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use mbtb_portal::{
    AppConfig, AppState, JwtSessionStore, Role, SessionContext, SessionStore,
    config::Env,
    session::{SessionClaims, session_token},
};
use std::time::SystemTime;
use uuid::Uuid;

// --- Helpers ---

const TEST_SECRET: &str = "test-session-secret-1234567890";
const TEST_SUBJECT: Uuid = Uuid::from_u128(7);

fn now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn mint_token(secret: &str, role: &str, exp_offset: i64) -> String {
    let now = now();
    let claims = SessionClaims {
        sub: TEST_SUBJECT,
        role: role.to_string(),
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn app_state_with(env: Env, dev_session_header: bool) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.dev_session_header = dev_session_header;
    config.session_secret = TEST_SECRET.to_string();
    AppState::from_config(config)
}

fn app_state(env: Env) -> AppState {
    app_state_with(env, false)
}

fn request_parts(headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().method(Method::GET).uri("/");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let (parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    parts
}

// --- Role boundary ---

#[test]
fn test_role_from_claim() {
    assert_eq!(Role::from_claim("admin"), Role::Admin);
    assert_eq!(Role::from_claim("user"), Role::User);
    assert_eq!(Role::from_claim(" Admin "), Role::Admin);
    assert_eq!(Role::from_claim("USER"), Role::User);
    assert_eq!(Role::from_claim("student"), Role::None);
    assert_eq!(Role::from_claim(""), Role::None);
}

#[test]
fn test_role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    assert_eq!(serde_json::to_string(&Role::None).unwrap(), "\"none\"");
}

// --- Token sources ---

#[test]
fn test_session_token_prefers_bearer_header() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
    headers.insert(header::COOKIE, HeaderValue::from_static("mbtb_session=def"));

    assert_eq!(session_token(&headers), Some("abc"));
}

#[test]
fn test_session_token_bearer_scheme_is_case_insensitive() {
    for value in ["bearer abc", "BEARER abc", "BeArEr   abc "] {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        assert_eq!(session_token(&headers), Some("abc"), "scheme in {value:?}");
    }

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearerabc"));
    assert_eq!(session_token(&headers), None);
}

#[test]
fn test_session_token_reads_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_static("theme=dark; mbtb_session=def; lang=en"),
    );

    assert_eq!(session_token(&headers), Some("def"));
}

#[test]
fn test_session_token_absent() {
    let mut headers = HeaderMap::new();
    assert_eq!(session_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
    headers.insert(header::COOKIE, HeaderValue::from_static("mbtb_session="));
    assert_eq!(session_token(&headers), None);
}

// --- JwtSessionStore ---

#[tokio::test]
async fn test_store_resolves_valid_admin_token() {
    let store = JwtSessionStore::new(TEST_SECRET);
    let token = mint_token(TEST_SECRET, "admin", 3600);

    let session = store.resolve(&token).await;

    assert_eq!(
        session,
        SessionContext::authenticated(Role::Admin, Some(TEST_SUBJECT))
    );
}

#[tokio::test]
async fn test_store_rejects_expired_token() {
    let store = JwtSessionStore::new(TEST_SECRET);
    let token = mint_token(TEST_SECRET, "user", -3600);

    assert_eq!(store.resolve(&token).await, SessionContext::anonymous());
}

#[tokio::test]
async fn test_store_rejects_foreign_signature() {
    let store = JwtSessionStore::new(TEST_SECRET);
    let token = mint_token("some-other-secret", "admin", 3600);

    assert_eq!(store.resolve(&token).await, SessionContext::anonymous());
}

#[tokio::test]
async fn test_store_rejects_garbage_and_unknown_roles() {
    let store = JwtSessionStore::new(TEST_SECRET);

    assert_eq!(store.resolve("not-a-jwt").await, SessionContext::anonymous());

    let token = mint_token(TEST_SECRET, "superuser", 3600);
    assert_eq!(store.resolve(&token).await, SessionContext::anonymous());
}

// --- SessionContext extractor ---

#[tokio::test]
async fn test_extractor_without_session_is_anonymous() {
    let state = app_state(Env::Production);
    let mut parts = request_parts(&[]);

    let session = SessionContext::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(session, SessionContext::anonymous());
}

#[tokio::test]
async fn test_extractor_resolves_bearer_token() {
    let state = app_state(Env::Production);
    let token = mint_token(TEST_SECRET, "user", 3600);
    let bearer = format!("Bearer {}", token);
    let mut parts = request_parts(&[("authorization", bearer.as_str())]);

    let session = SessionContext::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert!(session.is_authenticated);
    assert_eq!(session.role, Role::User);
    assert_eq!(session.subject, Some(TEST_SUBJECT));
}

#[tokio::test]
async fn test_local_dev_header_success() {
    let state = app_state_with(Env::Local, true);
    let mut parts = request_parts(&[("x-session-role", "admin")]);

    let session = SessionContext::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(session, SessionContext::authenticated(Role::Admin, None));
}

#[tokio::test]
async fn test_local_dev_header_disabled_in_prod() {
    // Even a hand-built config with the flag on cannot enable it in production.
    let state = app_state_with(Env::Production, true);
    let mut parts = request_parts(&[("x-session-role", "admin")]);

    let session = SessionContext::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(session, SessionContext::anonymous());
}

#[tokio::test]
async fn test_local_dev_header_with_unknown_role_falls_through() {
    let state = app_state_with(Env::Local, true);
    let token = mint_token(TEST_SECRET, "user", 3600);
    let bearer = format!("Bearer {}", token);
    let mut parts = request_parts(&[
        ("x-session-role", "root"),
        ("authorization", bearer.as_str()),
    ]);

    let session = SessionContext::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(session.role, Role::User);
    assert_eq!(session.subject, Some(TEST_SUBJECT));
}

#[tokio::test]
async fn test_local_dev_header_ignored_without_opt_in() {
    let state = app_state(Env::Local);
    let mut parts = request_parts(&[("x-session-role", "admin")]);

    let session = SessionContext::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(session, SessionContext::anonymous());
}

#[tokio::test]
async fn test_extractor_accepts_lowercase_bearer_scheme() {
    let state = app_state(Env::Production);
    let token = mint_token(TEST_SECRET, "admin", 3600);
    let bearer = format!("bearer {}", token);
    let mut parts = request_parts(&[("authorization", bearer.as_str())]);

    let session = SessionContext::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(session.role, Role::Admin);
}
