use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use husky_llm::{EmbeddingClient, Tool};
use husky_persist::VectorStore;
use serde_json::Value;

use super::{
    AsksTool, DirectoryTool, FocusAreasTool, ForumPostsTool, IrlEventsTool, MembersTool,
    NonDirectoryDocsTool, ProjectsTool, TeamsTool, ToolContext,
};

/// Tools by name, in registration order
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn DirectoryTool>>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The eight retrieval tools
    pub fn with_defaults(
        context: ToolContext,
        vectors: Arc<dyn VectorStore>,
        embeddings: Arc<dyn EmbeddingClient>,
    ) -> Self {
        let docs = NonDirectoryDocsTool::new(vectors, embeddings, context.config.clone());
        Self::new()
            .register(MembersTool::new(context.clone()))
            .register(TeamsTool::new(context.clone()))
            .register(ProjectsTool::new(context.clone()))
            .register(FocusAreasTool::new(context.clone()))
            .register(AsksTool::new(context.clone()))
            .register(IrlEventsTool::new(context.clone()))
            .register(ForumPostsTool::new(context))
            .register(docs)
    }

    /// Add a tool; a tool with the same name is replaced
    pub fn register(mut self, tool: impl DirectoryTool + 'static) -> Self {
        let name = tool.name();
        let tool: Arc<dyn DirectoryTool> = Arc::new(tool);
        match self.index.get(name) {
            Some(&position) => self.tools[position] = tool,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DirectoryTool>> {
        self.index.get(name).map(|&i| self.tools[i].clone())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn definitions(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow!("Unknown tool: {}", name))?;

        tracing::debug!(tool = name, args = %args, "Executing tool");
        let output = tool.execute(args).await?;
        tracing::debug!(tool = name, output_chars = output.len(), "Tool executed");

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl DirectoryTool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the arguments"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, args: Value) -> Result<String> {
            Ok(args.to_string())
        }
    }

    #[tokio::test]
    async fn test_execute_by_name() {
        let registry = ToolRegistry::new().register(EchoTool);
        let output = registry.execute("echo", json!({"a": 1})).await.unwrap();
        assert_eq!(output, r#"{"a":1}"#);
        assert_eq!(registry.definitions().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error() {
        let registry = ToolRegistry::new().register(EchoTool);
        let err = registry.execute("missing", Value::Null).await.unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let registry = ToolRegistry::new().register(EchoTool).register(EchoTool);
        assert_eq!(registry.names(), vec!["echo"]);
    }
}
