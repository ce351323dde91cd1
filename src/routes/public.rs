use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a session. The login surfaces live here so a
/// denied request always has somewhere to land.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(handlers::health))
        // GET /login
        // Redirect target for denied user-area requests.
        .route("/login", get(handlers::login_page))
        // GET /admin_login
        // Redirect target for denied admin-area requests.
        .route("/admin_login", get(handlers::admin_login_page))
}
