// Configuration layer for creating LLM clients from settings

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::OpenAIClient;
use crate::traits::{ChatClient, EmbeddingClient, LLMClient};

/// Configuration for an OpenAI-compatible provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Base URL for the API (optional, defaults to https://api.openai.com/v1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn build(self) -> Result<OpenAIClient> {
        match self.base_url {
            Some(base_url) => OpenAIClient::with_base_url(self.api_key, base_url),
            None => OpenAIClient::new(self.api_key),
        }
    }
}

/// Factory for creating LLM clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Create a chat + embedding client
    pub fn create_client(config: OpenAIConfig) -> Result<Arc<dyn LLMClient>> {
        Ok(Arc::new(config.build()?))
    }

    pub fn create_chat_client(config: OpenAIConfig) -> Result<Arc<dyn ChatClient>> {
        Ok(Arc::new(config.build()?))
    }

    pub fn create_embedding_client(config: OpenAIConfig) -> Result<Arc<dyn EmbeddingClient>> {
        Ok(Arc::new(config.build()?))
    }
}
