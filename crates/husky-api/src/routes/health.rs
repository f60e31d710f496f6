use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
    /// Persistence tasks still running
    pub background_tasks: usize,
}

/// Health check endpoint
///
/// Returns the health status of the API and its document store
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Document store unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let mut services = HashMap::new();

    let documents_up = match state.persist.documents().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Document store ping failed");
            false
        }
    };
    services.insert(
        "documents".to_string(),
        if documents_up { "connected" } else { "disconnected" }.to_string(),
    );

    let (status, label) = if documents_up {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services,
            background_tasks: state.engine.pending_background_tasks(),
        }),
    )
}
