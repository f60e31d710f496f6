#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use husky_engine::HuskyEngine;
use husky_llm::MockLLMClient;
use husky_persist::{
    InMemoryCacheStore, InMemoryDirectoryStore, InMemoryDocumentStore, InMemoryVectorStore,
    PersistClient, PersistError, ScoredPoint, VectorStore,
};
use husky_types::{AnswerEvent, HuskyConfig};
use serde_json::Value;
use tokio::sync::mpsc;

pub const ANSWER_CHUNKS: [&str; 3] = [
    r#"{"content":"Lotus is "#,
    r#"a Filecoin node.","followUpQuestions":["Who maintains Lotus?"],"#,
    r#""sources":["https://lotus.filecoin.io"],"actions":[]}"#,
];

/// Vector search that fails for the listed collections
pub struct FlakyVectorStore {
    pub inner: Arc<InMemoryVectorStore>,
    pub failing: HashSet<String>,
}

#[async_trait]
impl VectorStore for FlakyVectorStore {
    async fn search_embeddings(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        with_payload: bool,
    ) -> husky_persist::Result<Vec<ScoredPoint>> {
        if self.failing.contains(collection) {
            return Err(PersistError::VectorStore(format!("{} is down", collection)));
        }
        self.inner
            .search_embeddings(collection, vector, limit, with_payload)
            .await
    }
}

pub struct Fixture {
    pub llm: Arc<MockLLMClient>,
    pub vectors: Arc<InMemoryVectorStore>,
    pub cache: Arc<InMemoryCacheStore>,
    pub documents: Arc<InMemoryDocumentStore>,
    pub directory: Arc<InMemoryDirectoryStore>,
    pub engine: HuskyEngine,
}

pub fn fixture(llm: MockLLMClient) -> Fixture {
    fixture_with(llm, HuskyConfig::default(), &[])
}

pub fn fixture_with(llm: MockLLMClient, config: HuskyConfig, failing: &[&str]) -> Fixture {
    let llm = Arc::new(llm);
    let vectors = Arc::new(InMemoryVectorStore::new());
    let cache = Arc::new(InMemoryCacheStore::new());
    let documents = Arc::new(InMemoryDocumentStore::new());
    let directory = Arc::new(InMemoryDirectoryStore::new());

    let flaky = Arc::new(FlakyVectorStore {
        inner: vectors.clone(),
        failing: failing.iter().map(|c| c.to_string()).collect(),
    });
    let persist = PersistClient::new(
        &config.collections,
        flaky,
        cache.clone(),
        documents.clone(),
        directory.clone(),
    );
    let engine = HuskyEngine::builder()
        .llm_client(llm.clone())
        .persist(persist)
        .config(config)
        .build()
        .unwrap();

    Fixture {
        llm,
        vectors,
        cache,
        documents,
        directory,
        engine,
    }
}

/// A vector whose cosine similarity with `query` is `score`
pub fn vector_with_score(query: &[f32], score: f32) -> Vec<f32> {
    let norm = query.iter().map(|v| v * v).sum::<f32>().sqrt();
    let q: Vec<f32> = query.iter().map(|v| v / norm).collect();

    let orthogonal = (0..q.len())
        .map(|i| {
            let mut u: Vec<f32> = q.iter().map(|qj| -q[i] * qj).collect();
            u[i] += 1.0;
            u
        })
        .find(|u| u.iter().map(|v| v * v).sum::<f32>().sqrt() > 0.5)
        .unwrap();
    let u_norm = orthogonal.iter().map(|v| v * v).sum::<f32>().sqrt();

    let rest = (1.0 - score * score).max(0.0).sqrt();
    q.iter()
        .zip(&orthogonal)
        .map(|(qi, ui)| score * qi + rest * ui / u_norm)
        .collect()
}

impl Fixture {
    /// Store a point scoring `score` against the embedding of `text`
    pub async fn seed(&self, collection: &str, id: &str, text: &str, score: f32, payload: Value) {
        let query = self.llm.embed_text(text);
        self.vectors
            .upsert(collection, id, vector_with_score(&query, score), payload)
            .await;
    }

    /// The streamed answer request
    pub fn answer_request(&self) -> husky_llm::ChatRequest {
        self.llm
            .chat_requests()
            .into_iter()
            .find(|r| r.options.response_format.is_some())
            .expect("no answer request was made")
    }

    pub fn answer_system_prompt(&self) -> String {
        self.answer_request().messages[0].text().to_string()
    }
}

pub async fn collect(mut rx: mpsc::Receiver<AnswerEvent>) -> Vec<AnswerEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

pub fn stages(events: &[AnswerEvent]) -> Vec<husky_types::Stage> {
    events
        .iter()
        .filter_map(|e| match e {
            AnswerEvent::Stage { stage } => Some(*stage),
            _ => None,
        })
        .collect()
}

pub fn final_answer(events: &[AnswerEvent]) -> Option<husky_types::HuskyAnswer> {
    events.iter().find_map(|e| match e {
        AnswerEvent::Answer { answer } => Some(answer.clone()),
        _ => None,
    })
}
