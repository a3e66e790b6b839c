//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`, except the bare `/health` probe.
//! Middleware: CORS and request tracing. Route order places the static
//! `workflows` and `updates` prefixes alongside the dynamic `{domain}`
//! segment; the router gives static segments priority.

use axum::Router;
use axum::routing::{get, post};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Domain analysis
        .route("/{domain}/analyze", post(handlers::analyze::analyze))
        // Sessions
        .route("/{domain}/sessions", get(handlers::session::list_sessions))
        .route(
            "/{domain}/sessions/{id}",
            get(handlers::session::get_session),
        )
        .route(
            "/{domain}/sessions/{id}/approve",
            post(handlers::session::approve),
        )
        // Workflows
        .route("/workflows", post(handlers::workflow::create_workflow))
        .route("/workflows/{id}", get(handlers::workflow::get_workflow))
        .route(
            "/workflows/{id}/approve",
            post(handlers::workflow::approve_workflow),
        )
        // Update channels
        .route(
            "/updates/{channel}",
            get(handlers::update::list_updates).post(handlers::update::post_update),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - liveness probe.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(json!({
        "status": "ok",
        "service": "opsforge",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
