//! In-process adapters for development and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::filter::{DirectoryEntity, DirectoryQuery};
use crate::traits::{CacheStore, DirectoryStore, DocumentStore, ScoredPoint, VectorStore};

#[derive(Debug, Clone)]
struct StoredPoint {
    id: String,
    vector: Vec<f32>,
    payload: Value,
}

/// Brute-force cosine similarity search
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<StoredPoint>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(
        &self,
        collection: &str,
        id: impl Into<String>,
        vector: Vec<f32>,
        payload: Value,
    ) {
        let id = id.into();
        let mut collections = self.collections.write().await;
        let points = collections.entry(collection.to_string()).or_default();
        points.retain(|p| p.id != id);
        points.push(StoredPoint {
            id,
            vector,
            payload,
        });
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn search_embeddings(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>> {
        let collections = self.collections.read().await;
        let Some(points) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<ScoredPoint> = points
            .iter()
            .map(|p| ScoredPoint {
                id: p.id.clone(),
                score: cosine_similarity(vector, &p.vector),
                payload: with_payload.then(|| p.payload.clone()),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }
}

#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| *expires_at > Instant::now());
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }
}

/// Collections of JSON documents, with a write counter for assertions
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    writes: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of create/update calls that changed state
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

fn key_matches(document: &Value, key: &str, value: &str) -> bool {
    document.get(key).and_then(Value::as_str) == Some(value)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(&self, collection: &str, document: Value) -> Result<()> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_one_by_key(
        &self,
        collection: &str,
        key: &str,
        value: &str,
    ) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| key_matches(d, key, value)))
            .cloned())
    }

    async fn find_many_by_key(
        &self,
        collection: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| key_matches(d, key, value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_by_key(
        &self,
        collection: &str,
        key: &str,
        value: &str,
        update: Value,
    ) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| key_matches(d, key, value)))
        else {
            return Ok(false);
        };

        if let (Value::Object(target), Value::Object(fields)) = (document, update) {
            target.extend(fields);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Directory tables held as JSON rows
#[derive(Default)]
pub struct InMemoryDirectoryStore {
    tables: RwLock<HashMap<DirectoryEntity, Vec<Value>>>,
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, entity: DirectoryEntity, rows: impl IntoIterator<Item = Value>) {
        self.tables
            .write()
            .await
            .entry(entity)
            .or_default()
            .extend(rows);
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn query(&self, query: DirectoryQuery) -> Result<Vec<Value>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&query.entity)
            .map(|rows| query.apply(rows))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_vector_search_orders_by_score() {
        let store = InMemoryVectorStore::new();
        store.upsert("docs", "a", vec![1.0, 0.0], json!({"page_content": "A"})).await;
        store.upsert("docs", "b", vec![0.7, 0.7], json!({"page_content": "B"})).await;
        store.upsert("docs", "c", vec![0.0, 1.0], json!({"page_content": "C"})).await;

        let hits = store.search_embeddings("docs", &[1.0, 0.0], 2, true).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[1].id, "b");
        assert!(hits[0].payload.is_some());

        let bare = store.search_embeddings("docs", &[1.0, 0.0], 1, false).await.unwrap();
        assert!(bare[0].payload.is_none());
    }

    #[tokio::test]
    async fn test_unknown_collection_is_empty() {
        let store = InMemoryVectorStore::new();
        assert!(store.search_embeddings("nope", &[1.0], 5, true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cache_entries_expire() {
        let cache = InMemoryCacheStore::new();
        cache.set("k", "v", Duration::from_millis(30)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_by_key_merges_fields() {
        let store = InMemoryDocumentStore::new();
        store
            .create("threads", json!({"threadId": "t1", "title": null, "turns": []}))
            .await
            .unwrap();

        let updated = store
            .update_by_key("threads", "threadId", "t1", json!({"title": "Hello"}))
            .await
            .unwrap();
        assert!(updated);

        let doc = store.find_one_by_key("threads", "threadId", "t1").await.unwrap().unwrap();
        assert_eq!(doc["title"], "Hello");
        assert_eq!(doc["turns"], json!([]));
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_document_does_not_write() {
        let store = InMemoryDocumentStore::new();
        let updated = store
            .update_by_key("threads", "threadId", "ghost", json!({"title": "x"}))
            .await
            .unwrap();
        assert!(!updated);
        assert_eq!(store.write_count(), 0);
    }
}
