use chrono::{DateTime, Utc};
use husky_types::AnswerAction;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A conversation and its full turn history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRecord {
    pub thread_id: String,
    /// Email or user id of the owner
    pub owner: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl ThreadRecord {
    pub fn new(thread_id: impl Into<String>, owner: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            thread_id: thread_id.into(),
            owner: owner.into(),
            title: None,
            created_at: now,
            updated_at: now,
            turns: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> ThreadDescriptor {
        ThreadDescriptor {
            thread_id: self.thread_id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Turns in creation order
    pub fn sorted_turns(&self) -> Vec<Turn> {
        let mut turns = self.turns.clone();
        turns.sort_by_key(|t| t.created_at);
        turns
    }
}

/// Listing entry for a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDescriptor {
    pub thread_id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One question/answer exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub follow_ups: Vec<String>,
    #[serde(default)]
    pub actions: Vec<AnswerAction>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: None,
            sources: Vec::new(),
            follow_ups: Vec::new(),
            actions: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
