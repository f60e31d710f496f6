use std::sync::Arc;

use anyhow::Result;
use husky_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use husky_persist::{ThreadDescriptor, ThreadRecord, ThreadRepository, Turn};
use husky_types::{ChatExchange, ConversationConfig, HuskyAnswer};

use crate::rephrase::QuestionRephraser;
use crate::summary::{truncate_chars, SummaryManager};
use crate::templates::DEFAULT_THREAD_TITLE_PROMPT;

const UNTITLED: &str = "New conversation";

/// Owns threads, their turn history, running summaries and titles
pub struct ConversationManager {
    threads: ThreadRepository,
    summaries: Arc<SummaryManager>,
    rephraser: QuestionRephraser,
    llm_client: Arc<dyn ChatClient>,
    model: String,
    config: ConversationConfig,
}

impl ConversationManager {
    pub fn new(
        threads: ThreadRepository,
        summaries: Arc<SummaryManager>,
        rephraser: QuestionRephraser,
        llm_client: Arc<dyn ChatClient>,
        model: impl Into<String>,
        config: ConversationConfig,
    ) -> Self {
        Self {
            threads,
            summaries,
            rephraser,
            llm_client,
            model: model.into(),
            config,
        }
    }

    pub async fn create_thread(&self, thread_id: &str, owner: &str) -> Result<ThreadRecord> {
        let thread = ThreadRecord::new(thread_id, owner);
        self.threads.create(&thread).await?;
        tracing::info!(thread_id, owner, "Thread created");
        Ok(thread)
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<Option<ThreadRecord>> {
        Ok(self.threads.get(thread_id).await?)
    }

    pub async fn summary(&self, thread_id: &str) -> Result<Option<String>> {
        self.summaries.get(thread_id).await
    }

    pub async fn update_summary(&self, thread_id: &str, exchange: &ChatExchange) -> Result<String> {
        self.summaries.update(thread_id, exchange).await
    }

    pub async fn rephrase(&self, thread_id: &str, question: &str) -> Result<String> {
        self.rephraser.rephrase(thread_id, question).await
    }

    /// Record a finished exchange. A missing thread is not an error: nothing
    /// is written and `false` is returned.
    pub async fn persist_turn(
        &self,
        thread_id: &str,
        chat_id: &str,
        question: &str,
        answer: &HuskyAnswer,
    ) -> Result<bool> {
        let mut turn = Turn::new(chat_id, question);
        turn.answer = Some(answer.content.clone());
        turn.sources = answer.sources.clone();
        turn.follow_ups = answer.follow_up_questions.clone();
        turn.actions = answer.actions.clone();

        let written = self.threads.append_turn(thread_id, turn).await?;
        if !written {
            tracing::debug!(thread_id, chat_id, "No thread to persist the turn into, skipping");
        }
        Ok(written)
    }

    /// Threads of an owner, most recently updated first
    pub async fn threads_by_owner(&self, owner: &str) -> Result<Vec<ThreadDescriptor>> {
        Ok(self
            .threads
            .list_by_owner(owner)
            .await?
            .iter()
            .map(ThreadRecord::descriptor)
            .collect())
    }

    /// Turns of a thread in chronological order, `None` for an unknown thread
    pub async fn turns_by_thread(&self, thread_id: &str) -> Result<Option<Vec<Turn>>> {
        Ok(self
            .threads
            .get(thread_id)
            .await?
            .map(|thread| thread.sorted_turns()))
    }

    /// Title of a thread, generated from its first question on first use.
    ///
    /// Returns `None` for an unknown thread. A thread without turns gets a
    /// placeholder that is not stored, so a real title is generated later.
    pub async fn create_thread_title(&self, thread_id: &str) -> Result<Option<String>> {
        let Some(thread) = self.threads.get(thread_id).await? else {
            return Ok(None);
        };

        if let Some(title) = thread.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return Ok(Some(title.to_string()));
        }

        let Some(first_question) = thread.sorted_turns().into_iter().next().map(|t| t.question)
        else {
            return Ok(Some(UNTITLED.to_string()));
        };

        let prompt = DEFAULT_THREAD_TITLE_PROMPT
            .replace("<question>", &first_question)
            .replace("<max_chars>", &self.config.title_max_chars.to_string());
        let request = ChatRequest::new(self.model.clone(), vec![Message::human(prompt)])
            .with_options(ChatOptions::new().temperature(0.0).max_tokens(32));
        let response = self.llm_client.chat(request).await?;

        let generated = response.text().trim().trim_matches('"').trim();
        let source = if generated.is_empty() {
            first_question.trim()
        } else {
            generated
        };
        let title = truncate_chars(source, self.config.title_max_chars).to_string();

        self.threads.set_title(thread_id, &title).await?;
        tracing::info!(thread_id, title = %title, "Thread title generated");

        Ok(Some(title))
    }
}
