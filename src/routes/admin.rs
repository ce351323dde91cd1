use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Routes exclusively for sessions with the `admin` role. The router is
/// wrapped in `require_admin`, which inspects the role of the request's own
/// session; denied requests are redirected to `/admin_login`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/dashboard
        // Landing page of the admin area.
        .route("/dashboard", get(handlers::get_admin_dashboard))
}
