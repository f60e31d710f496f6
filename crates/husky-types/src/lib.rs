pub mod answer;
pub mod config;
pub mod events;
pub mod feedback;
pub mod question;
pub mod retrieval;

pub use answer::{answer_schema, AnswerAction, HuskyAnswer};
pub use config::{
    CollectionConfig, ConversationConfig, HuskyConfig, LinkConfig, MergePolicy, ModelConfig,
    PromptConfig, RetrievalConfig, ToolConfig,
};
pub use events::{AnswerEvent, Stage};
pub use feedback::FeedbackRequest;
pub use question::{ChatExchange, ChatQuestion};
pub use retrieval::{EntityType, RetrievalResult};
