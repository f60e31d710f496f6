use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use husky_llm::{EmbeddingClient, EmbeddingRequest};
use husky_persist::VectorStore;
use husky_types::{EntityType, HuskyConfig, MergePolicy, RetrievalResult};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{non_blank, parse_args, DirectoryTool, InvalidArguments};
use crate::merge::{context_lines, select};
use crate::retrieval::normalize_point;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocsArgs {
    query: Option<String>,
}

/// Semantic search over documents that are not directory records: the
/// general knowledge base and scraped web pages about teams
pub struct NonDirectoryDocsTool {
    vectors: Arc<dyn VectorStore>,
    embeddings: Arc<dyn EmbeddingClient>,
    config: Arc<HuskyConfig>,
}

impl NonDirectoryDocsTool {
    pub fn new(
        vectors: Arc<dyn VectorStore>,
        embeddings: Arc<dyn EmbeddingClient>,
        config: Arc<HuskyConfig>,
    ) -> Self {
        Self {
            vectors,
            embeddings,
            config,
        }
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        policy: &MergePolicy,
    ) -> Result<Vec<RetrievalResult>> {
        let points = self
            .vectors
            .search_embeddings(collection, vector, self.config.retrieval.search_limit, true)
            .await?;
        let results = points
            .into_iter()
            .filter_map(|p| {
                normalize_point(p, EntityType::NonDirectory, &self.config.links.directory_base_url)
            })
            .collect();
        Ok(select(results, policy))
    }
}

/// A failed collection contributes nothing
fn settle(collection: &str, results: Result<Vec<RetrievalResult>>) -> Vec<RetrievalResult> {
    results.unwrap_or_else(|e| {
        tracing::warn!(collection, error = %e, "Document search failed, continuing without it");
        Vec::new()
    })
}

#[async_trait]
impl DirectoryTool for NonDirectoryDocsTool {
    fn name(&self) -> &'static str {
        "non_directory_docs"
    }

    fn description(&self) -> &'static str {
        "Semantic search over documentation, blog posts and web pages that are not directory records."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Natural-language description of what to look for"}
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: DocsArgs = parse_args(self.name(), args)?;
        let Some(query) = non_blank(&args.query) else {
            return Err(InvalidArguments::new(self.name(), "'query' must not be empty").into());
        };

        let vector = self
            .embeddings
            .embed(EmbeddingRequest::new(&self.config.models.embedding_model, query))
            .await?
            .into_first()?;

        let retrieval = &self.config.retrieval;
        let collections = &self.config.collections;
        let (general, websearch) = futures::join!(
            self.search(&collections.non_directory, &vector, &retrieval.docs_general),
            self.search(&collections.websearch, &vector, &retrieval.docs_websearch),
        );

        let (general, websearch) = match (general, websearch) {
            (Err(general), Err(websearch)) => {
                bail!("Document search failed ({}; {})", general, websearch)
            }
            (general, websearch) => (
                settle(&collections.non_directory, general),
                settle(&collections.websearch, websearch),
            ),
        };

        Ok(context_lines(&general, &websearch).join("\n"))
    }
}
