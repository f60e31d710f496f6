use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use husky_types::FeedbackRequest;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Record a rating of an answer
///
/// Missing name, directory id and team are filled from the directory
/// member matching the email.
#[utoipa::path(
    post,
    path = "/husky/feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback recorded"),
        (status = 400, description = "Invalid request")
    ),
    tag = "feedback"
)]
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedbackRequest>,
) -> ApiResult<StatusCode> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt is required".to_string()));
    }

    state.engine.submit_feedback(req).await?;

    Ok(StatusCode::CREATED)
}
