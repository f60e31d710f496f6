use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use husky_engine::{DirectoryTool, InvalidArguments};
use husky_llm::Tool;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolResponse {
    pub tool: String,
    /// Formatted text blocks, empty when nothing matched
    pub result: String,
}

/// Definitions of the directory retrieval tools
#[utoipa::path(
    get,
    path = "/husky/tools",
    responses(
        (status = 200, description = "Tool definitions in function-calling format")
    ),
    tag = "tools"
)]
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<Vec<Tool>> {
    Json(state.engine.tools().definitions())
}

/// Run one retrieval tool with JSON arguments
#[utoipa::path(
    post,
    path = "/husky/tools/{name}",
    params(
        ("name" = String, Path, description = "Tool name")
    ),
    responses(
        (status = 200, description = "Tool output", body = ToolResponse),
        (status = 400, description = "Invalid arguments"),
        (status = 404, description = "Unknown tool")
    ),
    tag = "tools"
)]
pub async fn run_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult<Json<ToolResponse>> {
    let tool = state
        .engine
        .tools()
        .get(&name)
        .ok_or_else(|| ApiError::ToolNotFound(name.clone()))?;

    let args = body.map(|Json(args)| args).unwrap_or(Value::Null);
    let result = tool.execute(args).await.map_err(|e| {
        if let Some(invalid) = e.downcast_ref::<InvalidArguments>() {
            ApiError::BadRequest(invalid.to_string())
        } else {
            ApiError::from(e)
        }
    })?;

    tracing::debug!(tool = %name, bytes = result.len(), "Tool executed");

    Ok(Json(ToolResponse { tool: name, result }))
}
