use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::filter::DirectoryQuery;

/// One hit of a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Similarity search over embedding collections
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Nearest points of `collection`, ordered by score descending
    async fn search_embeddings(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>>;
}

/// Key/value store where expiry is the only eviction
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// Schema-less documents addressed by application-chosen key fields
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, collection: &str, document: Value) -> Result<()>;

    async fn find_one_by_key(&self, collection: &str, key: &str, value: &str)
        -> Result<Option<Value>>;

    async fn find_many_by_key(&self, collection: &str, key: &str, value: &str)
        -> Result<Vec<Value>>;

    /// Set the fields of `update` on the first matching document.
    /// Returns whether a document matched.
    async fn update_by_key(
        &self,
        collection: &str,
        key: &str,
        value: &str,
        update: Value,
    ) -> Result<bool>;

    /// Cheap reachability check
    async fn ping(&self) -> Result<()>;
}

/// Structured queries over the directory entities
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn query(&self, query: DirectoryQuery) -> Result<Vec<Value>>;
}
