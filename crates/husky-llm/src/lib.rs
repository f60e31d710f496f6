pub mod types;
pub mod traits;
pub mod streaming;
pub mod openai;
pub mod config;
pub mod mock;

pub use traits::{
    ChatClient,
    EmbeddingClient,
    LLMClient,
    ChatRequest, ChatResponse, ChatOptions,
    EmbeddingRequest, EmbeddingResponse,
    TokenUsage,
};

pub use streaming::StreamEvent;
pub use openai::OpenAIClient;
pub use config::{ClientFactory, OpenAIConfig};
pub use mock::MockLLMClient;
pub use types::{Message, Content, ResponseFormat, Tool};
