//! Retrieval tools over the directory and the document collections.
//!
//! Every tool takes JSON arguments where each filter is optional and
//! AND-combined with the others, and returns model-ready text.

mod asks;
mod focus_areas;
pub(crate) mod format;
mod forum_posts;
mod irl_events;
mod members;
mod non_directory_docs;
mod projects;
mod registry;
mod teams;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use husky_llm::Tool;
use husky_persist::DirectoryStore;
use husky_types::HuskyConfig;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use asks::AsksTool;
pub use focus_areas::FocusAreasTool;
pub use forum_posts::{ForumPostsTool, NO_FORUM_POSTS};
pub use irl_events::IrlEventsTool;
pub use members::MembersTool;
pub use non_directory_docs::NonDirectoryDocsTool;
pub use projects::ProjectsTool;
pub use registry::ToolRegistry;
pub use teams::TeamsTool;

#[async_trait]
pub trait DirectoryTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the arguments
    fn parameters(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<String>;

    /// OpenAI function definition
    fn definition(&self) -> Tool {
        Tool::new(self.name(), self.description(), self.parameters())
    }
}

/// What the directory-backed tools share
#[derive(Clone)]
pub struct ToolContext {
    pub directory: Arc<dyn DirectoryStore>,
    pub config: Arc<HuskyConfig>,
}

impl ToolContext {
    pub fn new(directory: Arc<dyn DirectoryStore>, config: Arc<HuskyConfig>) -> Self {
        Self { directory, config }
    }

    pub fn page_size(&self) -> usize {
        self.config.tools.page_size
    }

    pub fn directory_base_url(&self) -> &str {
        &self.config.links.directory_base_url
    }
}

/// Arguments a tool could not work with
#[derive(Debug, thiserror::Error)]
#[error("Invalid arguments for tool '{tool}': {reason}")]
pub struct InvalidArguments {
    pub tool: String,
    pub reason: String,
}

impl InvalidArguments {
    pub fn new(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// Parse tool arguments; `null` means no arguments
pub(crate) fn parse_args<T: DeserializeOwned + Default>(tool: &str, args: Value) -> Result<T> {
    if args.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(args).map_err(|e| InvalidArguments::new(tool, e.to_string()).into())
}

/// A filter argument that carries a value
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
