use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use husky_persist::{ThreadDescriptor, ThreadRecord};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadRequest {
    pub thread_id: String,
    pub email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListThreadsQuery {
    /// Owner of the threads
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TitleResponse {
    pub thread_id: String,
    pub title: String,
}

/// Create a new thread
#[utoipa::path(
    post,
    path = "/husky/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadDescriptor),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Thread id already taken")
    ),
    tag = "threads"
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadDescriptor>)> {
    let thread_id = req.thread_id.trim();
    if thread_id.is_empty() {
        return Err(ApiError::BadRequest("threadId is required".to_string()));
    }
    let email = req.email.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }

    let thread = state
        .engine
        .conversation()
        .create_thread(thread_id, email)
        .await?;

    Ok((StatusCode::CREATED, Json(thread.descriptor())))
}

/// List the threads of an owner, most recently updated first
#[utoipa::path(
    get,
    path = "/husky/threads",
    params(ListThreadsQuery),
    responses(
        (status = 200, description = "Threads of the owner", body = [ThreadDescriptor]),
        (status = 400, description = "Missing email")
    ),
    tag = "threads"
)]
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListThreadsQuery>,
) -> ApiResult<Json<Vec<ThreadDescriptor>>> {
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::BadRequest("email query parameter is required".to_string()))?;

    let threads = state.engine.conversation().threads_by_owner(email).await?;

    Ok(Json(threads))
}

/// Get a thread with its turns in chronological order
#[utoipa::path(
    get,
    path = "/husky/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread found", body = ThreadRecord),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadRecord>> {
    let mut thread = state
        .engine
        .conversation()
        .get_thread(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;

    thread.turns = thread.sorted_turns();

    Ok(Json(thread))
}

/// Title of a thread, generated from its first question on first call
#[utoipa::path(
    post,
    path = "/husky/threads/{thread_id}/title",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread title", body = TitleResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn create_title(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<TitleResponse>> {
    let title = state
        .engine
        .conversation()
        .create_thread_title(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;

    Ok(Json(TitleResponse { thread_id, title }))
}
