use std::sync::Arc;

use anyhow::Result;
use husky_llm::{ChatClient, ChatOptions, ChatRequest, Message};

use crate::summary::SummaryManager;
use crate::templates::DEFAULT_REPHRASE_PROMPT;

/// Rewrites follow-up questions against the thread summary before retrieval
pub struct QuestionRephraser {
    llm_client: Arc<dyn ChatClient>,
    summaries: Arc<SummaryManager>,
    model: String,
    template: String,
}

impl QuestionRephraser {
    pub fn new(
        llm_client: Arc<dyn ChatClient>,
        summaries: Arc<SummaryManager>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm_client,
            summaries,
            model: model.into(),
            template: DEFAULT_REPHRASE_PROMPT.to_string(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Without a summary the question is returned as-is and the model is
    /// not called.
    pub async fn rephrase(&self, thread_id: &str, question: &str) -> Result<String> {
        let Some(summary) = self.summaries.get(thread_id).await? else {
            return Ok(question.to_string());
        };

        let prompt = self
            .template
            .replace("<summary>", &summary)
            .replace("<question>", question);

        let request = ChatRequest::new(self.model.clone(), vec![Message::human(prompt)])
            .with_options(ChatOptions::new().temperature(0.0));
        let response = self.llm_client.chat(request).await?;

        let rephrased = response.text().trim();
        if rephrased.is_empty() {
            tracing::warn!(thread_id, "Rephrasing returned nothing, keeping the original question");
            return Ok(question.to_string());
        }

        tracing::debug!(thread_id, original = question, rephrased, "Question rephrased");
        Ok(rephrased.to_string())
    }
}
