use chrono::{DateTime, Utc};
use husky_types::FeedbackRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Immutable rating of an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: String,
    pub prompt: String,
    pub response: String,
    pub rating: i32,
    pub comment: String,
    pub name: Option<String>,
    pub team: Option<String>,
    pub directory_id: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FeedbackRequest> for FeedbackRecord {
    fn from(request: FeedbackRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prompt: request.prompt,
            response: request.response,
            rating: request.rating,
            comment: request.comment,
            name: request.name,
            team: request.team,
            directory_id: request.directory_id,
            email: request.email,
            created_at: Utc::now(),
        }
    }
}
