//! Concurrent vector search across every collection the answer draws on.

use std::sync::Arc;

use anyhow::{bail, Result};
use futures::future::join_all;
use husky_persist::{ScoredPoint, VectorStore};
use husky_types::{EntityType, HuskyConfig, RetrievalResult};
use serde_json::Value;

/// One collection searched during fan-out
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub label: &'static str,
    pub collection: String,
    pub entity: EntityType,
}

impl Branch {
    pub fn new(label: &'static str, collection: impl Into<String>, entity: EntityType) -> Self {
        Self {
            label,
            collection: collection.into(),
            entity,
        }
    }
}

/// Normalized hits split into the two merge pools
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    pub directory: Vec<RetrievalResult>,
    pub non_directory: Vec<RetrievalResult>,
    /// Labels of the branches that failed and contributed nothing
    pub failed_sources: Vec<&'static str>,
}

pub struct Retriever {
    vectors: Arc<dyn VectorStore>,
    branches: Vec<Branch>,
    search_limit: usize,
    directory_base_url: String,
}

impl Retriever {
    pub fn new(vectors: Arc<dyn VectorStore>, config: &HuskyConfig) -> Self {
        let c = &config.collections;
        let branches = vec![
            Branch::new("non_directory", &c.non_directory, EntityType::NonDirectory),
            Branch::new("websearch", &c.websearch, EntityType::NonDirectory),
            Branch::new("members", &c.members, EntityType::Member),
            Branch::new("teams", &c.teams, EntityType::Team),
            Branch::new("projects", &c.projects, EntityType::Project),
            Branch::new("focus_areas", &c.focus_areas, EntityType::FocusArea),
            Branch::new("irl_events", &c.irl_events, EntityType::IrlEvent),
        ];

        Self {
            vectors,
            branches,
            search_limit: config.retrieval.search_limit,
            directory_base_url: config.links.directory_base_url.clone(),
        }
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Search every branch concurrently with one embedding.
    ///
    /// Branches settle independently: a failing branch is logged and
    /// contributes no results. Fails only when every branch fails.
    pub async fn retrieve(&self, vector: &[f32]) -> Result<RetrievalOutcome> {
        let searches = self.branches.iter().map(|branch| async move {
            let hits = self
                .vectors
                .search_embeddings(&branch.collection, vector, self.search_limit, true)
                .await;
            (branch, hits)
        });

        let mut outcome = RetrievalOutcome::default();
        let mut errors = Vec::new();

        for (branch, hits) in join_all(searches).await {
            match hits {
                Ok(points) => {
                    let results = points
                        .into_iter()
                        .filter_map(|p| normalize_point(p, branch.entity, &self.directory_base_url));
                    if branch.entity.is_directory() {
                        outcome.directory.extend(results);
                    } else {
                        outcome.non_directory.extend(results);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        source = branch.label,
                        collection = %branch.collection,
                        error = %e,
                        "Retrieval branch failed, continuing without it"
                    );
                    outcome.failed_sources.push(branch.label);
                    errors.push(format!("{}: {}", branch.label, e));
                }
            }
        }

        if !self.branches.is_empty() && outcome.failed_sources.len() == self.branches.len() {
            bail!("Retrieval failed for every source ({})", errors.join("; "));
        }

        tracing::debug!(
            directory = outcome.directory.len(),
            non_directory = outcome.non_directory.len(),
            failed = outcome.failed_sources.len(),
            "Retrieval completed"
        );

        Ok(outcome)
    }
}

fn payload_str<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(payload, |value, key| value.get(*key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Common shape of a vector hit. Text and citation fields are trimmed, and
/// points without any text are dropped.
///
/// Document collections carry `page_content` and `metadata.source`;
/// directory collections carry `content` and are cited with the entity's
/// directory page.
pub fn normalize_point(
    point: ScoredPoint,
    entity: EntityType,
    directory_base_url: &str,
) -> Option<RetrievalResult> {
    let payload = point.payload.unwrap_or(Value::Null);

    if !entity.is_directory() {
        let text = payload_str(&payload, &["page_content"])
            .or_else(|| payload_str(&payload, &["content"]))?;
        let result = RetrievalResult::new(point.id, point.score, text, entity);
        return Some(match payload_str(&payload, &["metadata", "source"]) {
            Some(source) => result.with_source(source),
            None => result,
        });
    }

    let text = payload_str(&payload, &["content"])
        .or_else(|| payload_str(&payload, &["page_content"]))?;
    let uid = payload_str(&payload, &["uid"])
        .or_else(|| payload_str(&payload, &["metadata", "uid"]))
        .map(str::to_string)
        .unwrap_or_else(|| point.id.clone());

    let result = RetrievalResult::new(point.id, point.score, text, entity);
    Some(match entity.directory_link(directory_base_url, &uid) {
        Some(link) => result.with_source(link),
        None => result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(id: &str, payload: Value) -> ScoredPoint {
        ScoredPoint {
            id: id.to_string(),
            score: 0.8,
            payload: Some(payload),
        }
    }

    #[test]
    fn test_document_point_uses_page_content_and_source() {
        let result = normalize_point(
            point("1", json!({"page_content": "IPFS docs", "metadata": {"source": "https://docs.ipfs.tech"}})),
            EntityType::NonDirectory,
            "https://dir",
        )
        .unwrap();

        assert_eq!(result.text, "IPFS docs");
        assert_eq!(result.source.as_deref(), Some("https://docs.ipfs.tech"));
    }

    #[test]
    fn test_directory_point_links_to_entity_page() {
        let result = normalize_point(
            point("p-9", json!({"content": "Alice, engineer", "uid": "m1"})),
            EntityType::Member,
            "https://dir/",
        )
        .unwrap();

        assert_eq!(result.text, "Alice, engineer");
        assert_eq!(result.source.as_deref(), Some("https://dir/members/m1"));
    }

    #[test]
    fn test_directory_point_falls_back_to_point_id() {
        let result = normalize_point(
            point("t7", json!({"page_content": "Lotus team"})),
            EntityType::Team,
            "https://dir",
        )
        .unwrap();
        assert_eq!(result.source.as_deref(), Some("https://dir/teams/t7"));
    }

    #[test]
    fn test_padded_text_is_trimmed_before_length_checks() {
        let result = normalize_point(
            point("1", json!({"page_content": "   short   ", "metadata": {"source": " https://a "}})),
            EntityType::NonDirectory,
            "x",
        )
        .unwrap();
        assert_eq!(result.text, "short");
        assert_eq!(result.source.as_deref(), Some("https://a"));

        let policy = husky_types::MergePolicy::new(0.5, 5).with_min_text_len(5);
        assert!(crate::merge::select(vec![result], &policy).is_empty());

        assert!(normalize_point(point("2", json!({"content": "   "})), EntityType::Member, "x").is_none());
    }

    #[test]
    fn test_point_without_text_is_dropped() {
        assert!(normalize_point(point("1", json!({})), EntityType::NonDirectory, "x").is_none());
        let bare = ScoredPoint {
            id: "2".to_string(),
            score: 0.9,
            payload: None,
        };
        assert!(normalize_point(bare, EntityType::Member, "x").is_none());
    }

    #[test]
    fn test_seven_branches() {
        let retriever = Retriever::new(
            Arc::new(husky_persist::InMemoryVectorStore::new()),
            &HuskyConfig::default(),
        );
        let labels: Vec<&str> = retriever.branches().iter().map(|b| b.label).collect();
        assert_eq!(
            labels,
            vec!["non_directory", "websearch", "members", "teams", "projects", "focus_areas", "irl_events"]
        );
    }
}
