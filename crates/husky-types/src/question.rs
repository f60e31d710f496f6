use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Incoming chat request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatQuestion {
    pub question: String,
    pub thread_uid: String,
    pub chat_uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_id: Option<String>,

    /// Where the question was asked from (directory page, home, ...)
    #[serde(default)]
    pub source: String,

    /// The client's view of the previous exchange. When present the thread
    /// summary is refreshed before retrieval starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_summary: Option<ChatExchange>,
}

impl ChatQuestion {
    pub fn new(
        question: impl Into<String>,
        thread_uid: impl Into<String>,
        chat_uid: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            thread_uid: thread_uid.into(),
            chat_uid: chat_uid.into(),
            email: None,
            name: None,
            directory_id: None,
            source: String::new(),
            chat_summary: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_chat_summary(mut self, exchange: ChatExchange) -> Self {
        self.chat_summary = Some(exchange);
        self
    }
}

/// One user/system exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatExchange {
    pub user: String,
    pub system: String,
}

impl ChatExchange {
    pub fn new(user: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            system: system.into(),
        }
    }

    /// `user: ...\nsystem: ...`, the form fed to the summary fold
    pub fn render(&self) -> String {
        format!("user: {}\nsystem: {}", self.user, self.system)
    }
}
