pub mod config;
pub mod document;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::warn;

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.server.cors_allowed_origins);
    let body_limit = state.settings.upload.max_bytes;

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    let api_routes = Router::new()
        .route("/upload", post(handlers::upload::upload_handler))
        .route("/ask", post(handlers::ask::ask_handler))
        .route("/api/upload", post(handlers::upload::upload_handler))
        .route("/api/ask", post(handlers::ask::ask_handler))
        .route(
            "/api/sessions/{session_id}/history",
            get(handlers::session::history_handler),
        )
        .route(
            "/api/sessions/{session_id}",
            delete(handlers::session::close_session_handler),
        );

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(cors)
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        // Body limit (uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
