use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;

use husky_types::{AnswerEvent, ChatQuestion};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Answer a question and stream the pipeline events using Server-Sent Events
///
/// Every event carries its JSON payload under the SSE event name of its
/// type (`init`, `stage`, `delta`, `partial`, `answer`, `error`, `end`).
/// The stream always closes after `end`.
#[utoipa::path(
    post,
    path = "/husky/chat/contextual",
    request_body = ChatQuestion,
    responses(
        (status = 200, description = "Streaming answer as text/event-stream"),
        (status = 400, description = "Missing thread or chat id")
    ),
    tag = "chat"
)]
pub async fn contextual_chat(
    State(state): State<Arc<AppState>>,
    Json(question): Json<ChatQuestion>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    if question.thread_uid.trim().is_empty() {
        return Err(ApiError::BadRequest("threadUid is required".to_string()));
    }
    if question.chat_uid.trim().is_empty() {
        return Err(ApiError::BadRequest("chatUid is required".to_string()));
    }

    // 1. Start the pipeline; it keeps running if the client goes away
    let receiver = state.engine.spawn_answer(question);

    // 2. Convert pipeline events to SSE events
    let sse_stream = ReceiverStream::new(receiver).map(|event| Ok(to_sse_event(&event)));

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: &AnswerEvent) -> Event {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse_event) => sse_event,
        Err(e) => {
            tracing::error!(event = event.name(), error = %e, "Failed to encode stream event");
            Event::default()
                .event("error")
                .data(r#"{"type":"error","message":"Failed to encode event"}"#)
        }
    }
}
