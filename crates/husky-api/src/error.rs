use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use husky_persist::PersistError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Persist(#[from] PersistError),

    #[error("Internal error: {0:#}")]
    Internal(anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Engine errors keep their storage cause so it maps to the right status
impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<PersistError>() {
            Ok(persist) => ApiError::Persist(persist),
            Err(error) => ApiError::Internal(error),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ThreadNotFound(_) | ApiError::ToolNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Persist(PersistError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Persist(PersistError::AlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::Persist(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Persist(e) if status.is_server_error() => {
                tracing::error!("Persistence error: {}", e);
                "Storage error".to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!("Processing error: {:#}", e);
                "Processing error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
