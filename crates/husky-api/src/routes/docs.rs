use axum::Json;
use utoipa::OpenApi;

use husky_persist::{ThreadDescriptor, ThreadRecord, Turn};
use husky_types::{AnswerAction, ChatExchange, ChatQuestion, FeedbackRequest, HuskyAnswer};

use crate::handlers::stream;
use crate::routes::{feedback, health, threads, tools};

#[derive(OpenApi)]
#[openapi(
    info(title = "Husky API", description = "Contextual answers over the network directory"),
    paths(
        stream::contextual_chat,
        feedback::submit_feedback,
        threads::create_thread,
        threads::list_threads,
        threads::get_thread,
        threads::create_title,
        tools::list_tools,
        tools::run_tool,
        health::health_check,
    ),
    components(schemas(
        ChatQuestion,
        ChatExchange,
        HuskyAnswer,
        AnswerAction,
        FeedbackRequest,
        ThreadDescriptor,
        ThreadRecord,
        Turn,
        threads::CreateThreadRequest,
        threads::TitleResponse,
        tools::ToolResponse,
        health::HealthResponse,
    )),
    tags(
        (name = "chat", description = "Streaming contextual answers"),
        (name = "threads", description = "Conversation threads"),
        (name = "feedback", description = "Answer ratings"),
        (name = "tools", description = "Directory retrieval tools"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;

/// OpenAPI document of the service
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
