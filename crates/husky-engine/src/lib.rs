pub mod builder;
pub mod feedback;
pub mod identity;
pub mod merge;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;
pub mod structured;
pub mod tasks;
pub mod tools;

pub use builder::HuskyEngineBuilder;
pub use feedback::FeedbackService;
pub use identity::{DirectoryIdentityLookup, IdentityLookup, MemberIdentity};
pub use merge::{context_lines, merge_context, select};
pub use pipeline::HuskyEngine;
pub use prompt::{AssembledPrompt, PromptBuilder, PromptKind, CONTEXTUAL_ANSWER_PROMPT, NO_INFORMATION_PROMPT};
pub use retrieval::{normalize_point, Branch, RetrievalOutcome, Retriever};
pub use structured::{complete_partial_json, parse_final_answer, parse_partial_answer};
pub use tasks::BackgroundTasks;
pub use tools::{DirectoryTool, InvalidArguments, ToolContext, ToolRegistry, NO_FORUM_POSTS};
