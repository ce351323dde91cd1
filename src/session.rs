use std::{convert::Infallible, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;

/// Name of the cookie the login service sets on the browser.
pub const SESSION_COOKIE: &str = "mbtb_session";

/// Development-only header that fakes an authenticated session. Honoured only
/// when `AppConfig::dev_sessions_enabled()` is true.
pub const DEV_ROLE_HEADER: &str = "x-session-role";

/// Role
///
/// The closed set of principals a session can carry. Role strings coming from
/// outside the process are mapped onto this enum once, at the session-store
/// boundary, so nothing downstream ever compares raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    User,
    #[default]
    None,
}

impl Role {
    /// Maps a role claim onto `Role`. Anything unrecognised is `Role::None`.
    pub fn from_claim(claim: &str) -> Self {
        match claim.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "user" => Role::User,
            _ => Role::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::None => "none",
        }
    }
}

/// SessionClaims
///
/// Payload of the HS256 session token issued by the external login service.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the account the session belongs to.
    pub sub: Uuid,
    /// Raw role claim, validated into `Role` by the store.
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// SessionContext
///
/// Per-request snapshot of authentication state. Built at request ingress and
/// dropped with the request. An absent or unreadable session is represented by
/// `SessionContext::anonymous()`, never by an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionContext {
    pub is_authenticated: bool,
    pub role: Role,
    /// Account id, when the session store knows it. Not used for gating.
    pub subject: Option<Uuid>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(role: Role, subject: Option<Uuid>) -> Self {
        Self {
            is_authenticated: true,
            role,
            subject,
        }
    }
}

/// SessionStore
///
/// Resolves a raw session token into a typed `SessionContext`. Implementations
/// must fail closed: whatever goes wrong, the answer is the anonymous context.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn resolve(&self, token: &str) -> SessionContext;
}

/// SessionStoreState
///
/// Shared handle to the session store held in `AppState`.
pub type SessionStoreState = Arc<dyn SessionStore>;

/// JwtSessionStore
///
/// Stateless store backed by signed session tokens. Expiry is enforced by
/// `jsonwebtoken`'s validation; the store itself never refreshes a session.
pub struct JwtSessionStore {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionStore {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl SessionStore for JwtSessionStore {
    async fn resolve(&self, token: &str) -> SessionContext {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => {
                let role = Role::from_claim(&data.claims.role);
                if role == Role::None {
                    tracing::debug!(claim = %data.claims.role, "session carries unknown role");
                    return SessionContext::anonymous();
                }
                SessionContext::authenticated(role, Some(data.claims.sub))
            }
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                    kind => tracing::debug!(?kind, "session token rejected"),
                }
                SessionContext::anonymous()
            }
        }
    }
}

/// Pulls the session token out of the request: bearer header first, then cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    // Auth schemes are case-insensitive ("Bearer", "bearer", "BEARER").
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
    })
}

/// SessionContext Extractor
///
/// Resolves the request's session through the shared `SessionStore`. The
/// rejection type is `Infallible`: a request with no usable session still
/// yields a context, just an anonymous one, and the gate decides what to do.
///
/// The process involves:
/// 1. Dependency Resolution: pulling the session store and `AppConfig` from state.
/// 2. Development Header: only when `AppConfig::dev_sessions_enabled()` (local
///    environment AND the explicit `DEV_SESSION_HEADER` opt-in), the
///    `x-session-role` header short-circuits the store so the portal can be
///    exercised without a login service. Otherwise the header is ignored.
/// 3. Token Extraction: bearer header first, then the `mbtb_session` cookie.
/// 4. Store Lookup: the store validates the token and the role claim.
impl<S> FromRequestParts<S> for SessionContext
where
    // S must allow sending across threads and sharing.
    S: Send + Sync,
    // The shared session store resolves tokens.
    SessionStoreState: FromRef<S>,
    // The config decides whether the development header is honoured.
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        let store = SessionStoreState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 2. Development Header
        // Off unless explicitly enabled, and never available in production.
        if config.dev_sessions_enabled() {
            let dev_role = parts
                .headers
                .get(DEV_ROLE_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(Role::from_claim);

            // An unknown role in the header falls through to the normal token flow.
            if let Some(role) = dev_role.filter(|role| *role != Role::None) {
                tracing::debug!(role = role.as_str(), "using local development session");
                return Ok(SessionContext::authenticated(role, None));
            }
        }

        // 3. Token Extraction
        // No token at all is a normal anonymous request, not a rejection.
        let Some(token) = session_token(&parts.headers) else {
            return Ok(SessionContext::anonymous());
        };

        // 4. Store Lookup
        // The store fails closed: bad signatures, expiry and unknown roles all
        // come back as the anonymous context.
        Ok(store.resolve(token).await)
    }
}
