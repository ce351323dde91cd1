use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod config;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod session;

// Routing split by access level (public, user, admin).
pub mod routes;
use routes::{admin, public, user};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use gate::{AccessGate, Decision, RedirectTargets, RequiredRole};
pub use session::{JwtSessionStore, Role, SessionContext, SessionStore, SessionStoreState};

/// ApiDoc
///
/// OpenAPI document for the portal, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::login_page, handlers::admin_login_page,
        handlers::get_me, handlers::get_user_dashboard, handlers::get_admin_dashboard
    ),
    components(schemas(models::SessionProfile, session::Role)),
    tags(
        (name = "mbtb-portal", description = "MBTB Portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Single shared container for everything a request may need. Cloned per
/// request; every field is either an `Arc` or cheap immutable data.
#[derive(Clone)]
pub struct AppState {
    /// Session Layer: turns a raw token into a typed `SessionContext`.
    pub sessions: SessionStoreState,
    /// The authorization decision component, built from `config`.
    pub gate: AccessGate,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires the production collaborators from a loaded configuration.
    pub fn from_config(config: AppConfig) -> Self {
        let sessions = std::sync::Arc::new(JwtSessionStore::new(&config.session_secret))
            as SessionStoreState;
        let gate = AccessGate::new(RedirectTargets::from(&config));

        Self {
            sessions,
            gate,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionStoreState {
    fn from_ref(app_state: &AppState) -> SessionStoreState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AccessGate {
    fn from_ref(app_state: &AppState) -> AccessGate {
        app_state.gate.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, attaches the access gates to the protected
/// routers, and applies the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // User area: redirected to the user login surface on denial.
        .merge(
            user::user_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                gate::require_user,
            )),
        )
        // Admin area: redirected to the admin login surface on denial.
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                gate::require_admin,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` assigned above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
