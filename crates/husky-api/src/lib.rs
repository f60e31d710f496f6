pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::handlers::stream;
use crate::middleware::logging;
use crate::routes::{docs, feedback, health, threads, tools};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let husky_routes = Router::new()
        // Chat
        .route("/chat/contextual", post(stream::contextual_chat))
        // Feedback
        .route("/feedback", post(feedback::submit_feedback))
        // Threads
        .route("/threads", post(threads::create_thread).get(threads::list_threads))
        .route("/threads/:thread_id", get(threads::get_thread))
        .route("/threads/:thread_id/title", post(threads::create_title))
        // Tools
        .route("/tools", get(tools::list_tools))
        .route("/tools/:name", post(tools::run_tool));

    Router::new()
        .nest("/husky", husky_routes)
        .route("/health", get(health::health_check))
        .route("/api/openapi.json", get(docs::openapi_json))
        .layer(from_fn(logging::log_request))
        .layer(TimeoutLayer::new(Duration::from_secs(300))) // 5 min for streaming
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::new();
    }

    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<axum::http::HeaderValue> = config
        .cors
        .origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}
