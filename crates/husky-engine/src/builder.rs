use std::sync::Arc;

use anyhow::{anyhow, Result};
use husky_context::{ConversationManager, QuestionRephraser, SummaryManager, TokenCounter};
use husky_llm::{ChatClient, EmbeddingClient, LLMClient};
use husky_persist::PersistClient;
use husky_types::HuskyConfig;

use crate::feedback::FeedbackService;
use crate::identity::{DirectoryIdentityLookup, IdentityLookup};
use crate::pipeline::{AnswerPipeline, HuskyEngine};
use crate::prompt::PromptBuilder;
use crate::retrieval::Retriever;
use crate::tasks::BackgroundTasks;
use crate::tools::{ToolContext, ToolRegistry};

/// Builder for constructing a HuskyEngine
pub struct HuskyEngineBuilder {
    llm_client: Option<Arc<dyn LLMClient>>,
    persist: Option<PersistClient>,
    identity: Option<Arc<dyn IdentityLookup>>,
    config: HuskyConfig,
}

impl HuskyEngineBuilder {
    pub fn new() -> Self {
        Self {
            llm_client: None,
            persist: None,
            identity: None,
            config: HuskyConfig::default(),
        }
    }

    /// Client used for embeddings and every completion
    pub fn llm_client(mut self, client: Arc<dyn LLMClient>) -> Self {
        self.llm_client = Some(client);
        self
    }

    /// Storage adapters
    pub fn persist(mut self, persist: PersistClient) -> Self {
        self.persist = Some(persist);
        self
    }

    /// Replace the directory-backed member lookup
    pub fn identity_lookup(mut self, identity: Arc<dyn IdentityLookup>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn config(mut self, config: HuskyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<HuskyEngine> {
        let llm_client = self
            .llm_client
            .ok_or_else(|| anyhow!("LLM client is required"))?;
        let persist = self
            .persist
            .ok_or_else(|| anyhow!("Persist client is required"))?;
        let config = Arc::new(self.config);

        let chat: Arc<dyn ChatClient> = Arc::new(llm_client.clone());
        let embeddings: Arc<dyn EmbeddingClient> = Arc::new(llm_client.clone());
        let model = config.models.chat_model.clone();

        let summaries = Arc::new(SummaryManager::new(
            chat.clone(),
            persist.cache(),
            model.clone(),
            config.conversation.clone(),
        ));
        let rephraser = QuestionRephraser::new(chat.clone(), summaries.clone(), model.clone());
        let conversation = Arc::new(ConversationManager::new(
            persist.threads().clone(),
            summaries,
            rephraser,
            chat,
            model,
            config.conversation.clone(),
        ));

        let prompts = PromptBuilder::new(Arc::new(TokenCounter::new()?), &config.prompt);
        let retriever = Retriever::new(persist.vectors(), &config);

        let tools = ToolRegistry::with_defaults(
            ToolContext::new(persist.directory(), config.clone()),
            persist.vectors(),
            embeddings,
        );

        let identity = self
            .identity
            .unwrap_or_else(|| {
                Arc::new(DirectoryIdentityLookup::new(persist.directory())) as Arc<dyn IdentityLookup>
            });
        let feedback = FeedbackService::new(persist.feedback().clone(), identity.clone());

        tracing::info!(
            chat_model = %config.models.chat_model,
            embedding_model = %config.models.embedding_model,
            tools = tools.names().len(),
            "Husky engine built"
        );

        Ok(HuskyEngine {
            pipeline: Arc::new(AnswerPipeline {
                llm_client,
                conversation,
                retriever,
                prompts,
                config,
                background: BackgroundTasks::new(),
            }),
            tools,
            feedback,
            identity,
        })
    }
}

impl Default for HuskyEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
