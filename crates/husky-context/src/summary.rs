use std::sync::Arc;

use anyhow::Result;
use husky_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use husky_persist::CacheStore;
use husky_types::{ChatExchange, ConversationConfig};

use crate::templates::DEFAULT_SUMMARY_FOLD_PROMPT;

const NO_SUMMARY: &str = "No summary yet.";

pub fn summary_key(thread_id: &str) -> String {
    format!("{}:summary", thread_id)
}

/// Cut `text` to at most `max_chars` characters, never splitting a char
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Running conversation summary kept in the cache store
pub struct SummaryManager {
    llm_client: Arc<dyn ChatClient>,
    cache: Arc<dyn CacheStore>,
    model: String,
    config: ConversationConfig,
    fold_template: String,
}

impl SummaryManager {
    pub fn new(
        llm_client: Arc<dyn ChatClient>,
        cache: Arc<dyn CacheStore>,
        model: impl Into<String>,
        config: ConversationConfig,
    ) -> Self {
        Self {
            llm_client,
            cache,
            model: model.into(),
            config,
            fold_template: DEFAULT_SUMMARY_FOLD_PROMPT.to_string(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.fold_template = template.into();
        self
    }

    pub async fn get(&self, thread_id: &str) -> Result<Option<String>> {
        let summary = self.cache.get(&summary_key(thread_id)).await?;
        Ok(summary.filter(|s| !s.trim().is_empty()))
    }

    /// Fold `exchange` into the thread's summary and store the result
    pub async fn update(&self, thread_id: &str, exchange: &ChatExchange) -> Result<String> {
        // 1. Read the summary this update builds on
        let previous = self.get(thread_id).await?;

        // 2. Fold it with the latest exchange
        let prompt = self
            .fold_template
            .replace("<previous_summary>", previous.as_deref().unwrap_or(NO_SUMMARY))
            .replace("<exchange>", &exchange.render())
            .replace("<max_chars>", &self.config.summary_max_chars.to_string());

        let request = ChatRequest::new(self.model.clone(), vec![Message::human(prompt)])
            .with_options(ChatOptions::new().temperature(0.0));
        let response = self.llm_client.chat(request).await?;

        // 3. Enforce the bound regardless of what the model returned
        let summary =
            truncate_chars(response.text().trim(), self.config.summary_max_chars).to_string();

        self.cache
            .set(&summary_key(thread_id), &summary, self.config.summary_ttl())
            .await?;

        tracing::debug!(
            thread_id,
            chars = summary.chars().count(),
            had_previous = previous.is_some(),
            "Conversation summary updated"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_summary_key() {
        assert_eq!(summary_key("t-42"), "t-42:summary");
    }
}
