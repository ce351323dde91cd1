use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    config::AppConfig,
    session::{Role, SessionContext},
};

/// RequiredRole
///
/// The role a protected route demands. There is no `None` variant: a route
/// cannot require "nobody".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredRole {
    Admin,
    User,
}

impl From<RequiredRole> for Role {
    fn from(required: RequiredRole) -> Self {
        match required {
            RequiredRole::Admin => Role::Admin,
            RequiredRole::User => Role::User,
        }
    }
}

/// Decision
///
/// Outcome of a gate check. `Deny` is a normal result, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { redirect_target: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// RedirectTargets
///
/// Static, per-role login surfaces a denied request is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTargets {
    pub admin_login: String,
    pub user_login: String,
}

impl Default for RedirectTargets {
    fn default() -> Self {
        Self {
            admin_login: "/admin_login".to_string(),
            user_login: "/login".to_string(),
        }
    }
}

impl From<&AppConfig> for RedirectTargets {
    fn from(config: &AppConfig) -> Self {
        Self {
            admin_login: config.admin_login_path.clone(),
            user_login: config.user_login_path.clone(),
        }
    }
}

impl RedirectTargets {
    pub fn for_role(&self, required: RequiredRole) -> &str {
        match required {
            RequiredRole::Admin => &self.admin_login,
            RequiredRole::User => &self.user_login,
        }
    }
}

/// AccessGate
///
/// Binary authorization decision per request. Holds no mutable state, so a
/// single instance is cloned into every request without locking.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    targets: RedirectTargets,
}

impl AccessGate {
    pub fn new(targets: RedirectTargets) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &RedirectTargets {
        &self.targets
    }

    /// check
    ///
    /// Allows iff the session is authenticated and its role is exactly
    /// `required`. Every other combination (anonymous, wrong role, `Role::None`)
    /// is a `Deny` carrying the login surface configured for `required`.
    ///
    /// Pure: the session is only read, and the same input always yields the
    /// same decision.
    pub fn check(&self, session: &SessionContext, required: RequiredRole) -> Decision {
        if session.is_authenticated && session.role == Role::from(required) {
            return Decision::Allow;
        }

        Decision::Deny {
            redirect_target: self.targets.for_role(required).to_string(),
        }
    }
}

/// guard
///
/// Shared body of the route layers below.
///
/// The process involves:
/// 1. Decision: `AccessGate::check` against the session the extractor resolved.
/// 2. Allow: the session is handed to the handler through request extensions
///    and the request continues down the stack.
/// 3. Deny: the handler is never invoked; the caller gets a 303 to the
///    role-specific login surface.
async fn guard(
    gate: &AccessGate,
    session: SessionContext,
    required: RequiredRole,
    mut request: Request,
    next: Next,
) -> Response {
    // 1. Decision
    match gate.check(&session, required) {
        // 2. Allow
        Decision::Allow => {
            // Handlers downstream read the already-resolved session from extensions,
            // so the token is not decoded a second time.
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        // 3. Deny
        Decision::Deny { redirect_target } => {
            tracing::info!(
                required = ?required,
                role = session.role.as_str(),
                authenticated = session.is_authenticated,
                target = %redirect_target,
                "access denied, redirecting"
            );
            Redirect::to(&redirect_target).into_response()
        }
    }
}

/// require_admin
///
/// Route layer for the admin area. Redirects to the admin login surface unless
/// the request's own session carries the admin role.
pub async fn require_admin(
    State(gate): State<AccessGate>,
    session: SessionContext,
    request: Request,
    next: Next,
) -> Response {
    guard(&gate, session, RequiredRole::Admin, request, next).await
}

/// require_user
///
/// Route layer for the user area. Redirects to the general login surface.
pub async fn require_user(
    State(gate): State<AccessGate>,
    session: SessionContext,
    request: Request,
    next: Next,
) -> Response {
    guard(&gate, session, RequiredRole::User, request, next).await
}
