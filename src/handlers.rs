use crate::models::SessionProfile;
use crate::session::SessionContext;
use axum::{Extension, Json};

// --- Public Handlers ---

/// health
///
/// [Public Route] Liveness probe for load balancers.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// login_page
///
/// [Public Route] Placeholder for the general login surface. The real page is
/// served by the front end; this keeps redirects from landing on a 404.
#[utoipa::path(
    get,
    path = "/login",
    responses((status = 200, description = "Login surface", body = String))
)]
pub async fn login_page() -> &'static str {
    "login required"
}

/// admin_login_page
///
/// [Public Route] Placeholder for the administrator login surface.
#[utoipa::path(
    get,
    path = "/admin_login",
    responses((status = 200, description = "Admin login surface", body = String))
)]
pub async fn admin_login_page() -> &'static str {
    "admin login required"
}

// --- User Handlers ---

/// get_me
///
/// [User Route] Describes the caller's session.
///
/// *Note*: `require_user` has already admitted the request and stored the
/// resolved `SessionContext` in the request extensions.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current session", body = SessionProfile),
        (status = 303, description = "Redirect to /login")
    )
)]
pub async fn get_me(Extension(session): Extension<SessionContext>) -> Json<SessionProfile> {
    Json(SessionProfile::from_session(&session, "user"))
}

/// get_user_dashboard
///
/// [User Route] Landing page of the user area.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "User dashboard", body = SessionProfile),
        (status = 303, description = "Redirect to /login")
    )
)]
pub async fn get_user_dashboard(
    Extension(session): Extension<SessionContext>,
) -> Json<SessionProfile> {
    tracing::debug!(subject = ?session.subject, "serving user dashboard");
    Json(SessionProfile::from_session(&session, "user"))
}

// --- Admin Handlers ---

/// get_admin_dashboard
///
/// [Admin Route] Landing page of the admin area. Only reachable through
/// `require_admin`, so the role is trusted here without another check.
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses(
        (status = 200, description = "Admin dashboard", body = SessionProfile),
        (status = 303, description = "Redirect to /admin_login")
    )
)]
pub async fn get_admin_dashboard(
    Extension(session): Extension<SessionContext>,
) -> Json<SessionProfile> {
    tracing::debug!(subject = ?session.subject, "serving admin dashboard");
    Json(SessionProfile::from_session(&session, "admin"))
}
