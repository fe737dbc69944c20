//! Router configuration for the HTTP API.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; the dashboard is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let analytics = Router::new()
        .route("/impact/{mission_id}", get(handlers::get_mission_impact))
        .route("/impact/{mission_id}/history", get(handlers::get_mission_history));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/analytics", analytics)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
