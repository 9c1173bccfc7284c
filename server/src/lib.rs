//! `vpnsentinel-server` library surface: router construction, app
//! state, and the background workers. `main.rs` wires these into three
//! bound listeners; `tests/api.rs` drives the routers in-process via
//! `tower::ServiceExt::oneshot`.

pub mod config;
pub mod error;
pub mod ratelimit;
pub mod routes;
pub mod security;
pub mod state;
pub mod sweep;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The authenticated, rate-limited, IP-allowlisted API router (§4.6).
/// Middleware order (outermost first): access log/CORS, IP allowlist,
/// rate limit, API key, handler.
pub fn build_api_router(state: Arc<AppState>) -> Router {
    let api_path = state.config.api_path.clone();
    Router::new()
        .route(&format!("{api_path}/keepalive"), post(routes::api::keepalive))
        .route(&format!("{api_path}/status"), get(routes::api::status))
        .layer(axum::middleware::from_fn_with_state(state.clone(), security::api_key))
        .layer(axum::middleware::from_fn_with_state(state.clone(), ratelimit::rate_limit))
        .layer(axum::middleware::from_fn_with_state(state.clone(), security::ip_allowlist))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

/// Public, unauthenticated, unrate-limited health router (§4.6).
pub fn build_health_router() -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/health/ready", get(routes::health::ready))
        .route("/health/startup", get(routes::health::startup))
        .layer(TraceLayer::new_for_http())
}

/// Public, read-only dashboard router (§4.6), empty when disabled by
/// config.
pub fn build_dashboard_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new();
    if state.config.dashboard_enabled {
        router = router.route("/dashboard", get(routes::dashboard::dashboard));
    }
    router.layer(TraceLayer::new_for_http()).with_state(state)
}
