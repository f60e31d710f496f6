mod manager;
mod rephrase;
mod summary;
mod templates;
mod tokens;

pub use manager::ConversationManager;
pub use rephrase::QuestionRephraser;
pub use summary::{summary_key, truncate_chars, SummaryManager};
pub use templates::{
    DEFAULT_REPHRASE_PROMPT, DEFAULT_SUMMARY_FOLD_PROMPT, DEFAULT_THREAD_TITLE_PROMPT,
};
pub use tokens::TokenCounter;
