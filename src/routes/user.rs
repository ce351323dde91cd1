use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// User Router Module
///
/// Routes for any signed-in account holding the `user` role. The whole router
/// is wrapped in `require_user`; an administrator session is not a user
/// session and is redirected to `/login` like an anonymous one.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        // GET /me
        // Describes the session the request was admitted under.
        .route("/me", get(handlers::get_me))
        // GET /dashboard
        // Landing page of the user area.
        .route("/dashboard", get(handlers::get_user_dashboard))
}
