//! Axum router configuration with middleware.
//!
//! Message routes are under `/api/`; `/health` sits at the root.
//! Middleware: CORS (single allowed origin, with credentials), tracing.

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.frontend_url);

    let api_routes = Router::new().route(
        "/messages",
        get(handlers::messages::get_messages)
            .post(handlers::messages::send_message)
            .delete(handlers::messages::clear_messages),
    );

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for exactly one origin. An origin that is not a valid header value
/// allows no cross-origin callers at all.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    match frontend_url.trim_end_matches('/').parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(frontend_url, error = %e, "Invalid frontend URL, CORS disabled");
            layer
        }
    }
}

/// GET /health - Liveness probe.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "Backend is running",
    }))
}
