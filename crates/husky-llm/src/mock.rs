//! Scriptable in-process LLM client.
//!
//! Used by the test suites of the downstream crates. Chat replies are served
//! from a queue and streams replay scripted chunks. Embeddings are
//! deterministic bag-of-words vectors, so texts that share words land close
//! to each other.

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::streaming::StreamEvent;
use crate::traits::{
    ChatClient, ChatRequest, ChatResponse, EmbeddingClient, EmbeddingRequest, EmbeddingResponse,
    EventStream, LLMClient,
};

const DEFAULT_REPLY: &str = "mock response";
const DEFAULT_DIMENSIONS: usize = 64;

pub struct MockLLMClient {
    chat_responses: Mutex<VecDeque<String>>,
    stream_chunks: Option<Vec<String>>,
    stream_error: Option<String>,
    chunk_delay: Option<Duration>,
    fail_chat: bool,
    fail_embeddings: bool,
    dimensions: usize,
    chat_requests: Mutex<Vec<ChatRequest>>,
    embedded_inputs: Mutex<Vec<String>>,
}

impl Default for MockLLMClient {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockLLMClient {
    pub fn new() -> Self {
        Self {
            chat_responses: Mutex::new(VecDeque::new()),
            stream_chunks: None,
            stream_error: None,
            chunk_delay: None,
            fail_chat: false,
            fail_embeddings: false,
            dimensions: DEFAULT_DIMENSIONS,
            chat_requests: Mutex::new(Vec::new()),
            embedded_inputs: Mutex::new(Vec::new()),
        }
    }

    /// Replies returned in order by `chat`. Once drained, `chat` answers
    /// with a fixed placeholder.
    pub fn with_chat_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.chat_responses).extend(responses.into_iter().map(Into::into));
        self
    }

    /// Chunks replayed by every `chat_stream` call
    pub fn with_stream_chunks<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stream_chunks = Some(chunks.into_iter().map(Into::into).collect());
        self
    }

    /// Emit an error after the scripted chunks instead of finishing
    pub fn with_stream_error(mut self, message: impl Into<String>) -> Self {
        self.stream_error = Some(message.into());
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions.max(1);
        self
    }

    pub fn failing_chat(mut self) -> Self {
        self.fail_chat = true;
        self
    }

    pub fn failing_embeddings(mut self) -> Self {
        self.fail_embeddings = true;
        self
    }

    /// Every chat request seen so far, streaming or not
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        lock(&self.chat_requests).clone()
    }

    pub fn embedded_inputs(&self) -> Vec<String> {
        lock(&self.embedded_inputs).clone()
    }

    /// Embed a single text with the same function `embed` uses
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let slot = (hasher.finish() % self.dimensions as u64) as usize;
            vector[slot] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }

    fn next_reply(&self) -> String {
        lock(&self.chat_responses)
            .pop_front()
            .unwrap_or_else(|| DEFAULT_REPLY.to_string())
    }
}

#[async_trait]
impl ChatClient for MockLLMClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        lock(&self.chat_requests).push(request);

        if self.fail_chat {
            anyhow::bail!("mock chat failure");
        }

        let reply = self.next_reply();
        Ok(ChatResponse {
            content: Some(reply.clone()),
            usage: None,
            finish_reason: Some("stop".to_string()),
            raw: Value::String(reply),
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        lock(&self.chat_requests).push(request);

        if self.fail_chat {
            anyhow::bail!("mock chat failure");
        }

        let chunks = match &self.stream_chunks {
            Some(chunks) => chunks.clone(),
            None => vec![self.next_reply()],
        };
        let stream_error = self.stream_error.clone();
        let delay = self.chunk_delay;

        Ok(Box::pin(async_stream::stream! {
            for chunk in chunks {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(StreamEvent::Message { content: chunk });
            }

            match stream_error {
                Some(message) => yield Err(anyhow::anyhow!(message)),
                None => yield Ok(StreamEvent::Done {
                    finish_reason: Some("stop".to_string()),
                }),
            }
        }))
    }
}

#[async_trait]
impl EmbeddingClient for MockLLMClient {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        lock(&self.embedded_inputs).extend(request.input.iter().cloned());

        if self.fail_embeddings {
            anyhow::bail!("mock embedding failure");
        }

        Ok(EmbeddingResponse {
            embeddings: request.input.iter().map(|text| self.embed_text(text)).collect(),
            usage: None,
        })
    }
}

impl LLMClient for MockLLMClient {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::collect_text;
    use crate::types::Message;

    #[tokio::test]
    async fn test_chat_replies_in_order_then_default() {
        let client = MockLLMClient::new().with_chat_responses(["first", "second"]);
        let req = || ChatRequest::new("m", vec![Message::human("hi")]);

        assert_eq!(client.chat(req()).await.unwrap().text(), "first");
        assert_eq!(client.chat(req()).await.unwrap().text(), "second");
        assert_eq!(client.chat(req()).await.unwrap().text(), DEFAULT_REPLY);
        assert_eq!(client.chat_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_stream_replays_chunks() {
        let client = MockLLMClient::new().with_stream_chunks(["Hel", "lo"]);
        let stream = client
            .chat_stream(ChatRequest::new("m", vec![Message::human("hi")]))
            .await
            .unwrap();
        assert_eq!(collect_text(stream).await.unwrap(), "Hello");
    }

    #[tokio::test]
    async fn test_stream_error_surfaces() {
        let client = MockLLMClient::new()
            .with_stream_chunks(["partial"])
            .with_stream_error("boom");
        let stream = client
            .chat_stream(ChatRequest::new("m", vec![Message::human("hi")]))
            .await
            .unwrap();
        assert!(collect_text(stream).await.is_err());
    }

    #[test]
    fn test_embeddings_are_deterministic_and_normalized() {
        let client = MockLLMClient::new();
        let a = client.embed_text("Protocol Labs research");
        let b = client.embed_text("protocol labs research");
        assert_eq!(a, b);

        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_embeds_to_zero_vector() {
        let client = MockLLMClient::new().with_dimensions(8);
        assert_eq!(client.embed_text("   "), vec![0.0; 8]);
    }
}
