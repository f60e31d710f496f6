use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{PersistError, Result};
use crate::traits::{ScoredPoint, VectorStore};

/// Qdrant over its REST API
pub struct QdrantVectorStore {
    http_client: reqwest::Client,
    base_url: String,
}

impl QdrantVectorStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            headers.insert(
                "api-key",
                HeaderValue::from_str(key)
                    .map_err(|e| PersistError::Connection(format!("Invalid Qdrant API key: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<QdrantPoint>,
}

#[derive(Debug, Deserialize)]
struct QdrantPoint {
    id: Value,
    score: f32,
    #[serde(default)]
    payload: Option<Value>,
}

fn point_id(id: Value) -> String {
    match id {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn search_embeddings(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>> {
        let url = format!("{}/collections/{}/points/search", self.base_url, collection);
        let body = serde_json::json!({
            "vector": vector,
            "limit": limit,
            "with_payload": with_payload,
        });

        let response = self.http_client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PersistError::VectorStore(format!(
                "search in '{}' failed ({}): {}",
                collection, status, error_text
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        tracing::debug!(collection, hits = parsed.result.len(), "Vector search completed");

        Ok(parsed
            .result
            .into_iter()
            .map(|p| ScoredPoint {
                id: point_id(p.id),
                score: p.score,
                payload: p.payload,
            })
            .collect())
    }
}
