use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::error::{PersistError, Result};
use crate::models::{ThreadRecord, Turn};
use crate::traits::DocumentStore;

const THREAD_KEY: &str = "threadId";

#[derive(Clone)]
pub struct ThreadRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl ThreadRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Insert a new thread, rejecting an id that is already taken
    pub async fn create(&self, thread: &ThreadRecord) -> Result<()> {
        if self.get(&thread.thread_id).await?.is_some() {
            return Err(PersistError::AlreadyExists(format!(
                "thread {}",
                thread.thread_id
            )));
        }
        self.store
            .create(&self.collection, serde_json::to_value(thread)?)
            .await
    }

    pub async fn get(&self, thread_id: &str) -> Result<Option<ThreadRecord>> {
        self.store
            .find_one_by_key(&self.collection, THREAD_KEY, thread_id)
            .await?
            .map(|doc| serde_json::from_value(doc).map_err(PersistError::from))
            .transpose()
    }

    /// Threads of an owner, most recently updated first
    pub async fn list_by_owner(&self, owner: &str) -> Result<Vec<ThreadRecord>> {
        let mut threads = self
            .store
            .find_many_by_key(&self.collection, "owner", owner)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(PersistError::from))
            .collect::<Result<Vec<ThreadRecord>>>()?;
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(threads)
    }

    /// Append a turn to an existing thread.
    ///
    /// Returns `false` without writing anything when the thread does not
    /// exist. The read-modify-write is not atomic: concurrent appends to one
    /// thread may lose a turn.
    pub async fn append_turn(&self, thread_id: &str, turn: Turn) -> Result<bool> {
        let Some(mut thread) = self.get(thread_id).await? else {
            return Ok(false);
        };

        thread.turns.push(turn);
        let update = json!({
            "turns": serde_json::to_value(&thread.turns)?,
            "updatedAt": serde_json::to_value(Utc::now())?,
        });
        self.store
            .update_by_key(&self.collection, THREAD_KEY, thread_id, update)
            .await
    }

    pub async fn set_title(&self, thread_id: &str, title: &str) -> Result<bool> {
        self.store
            .update_by_key(
                &self.collection,
                THREAD_KEY,
                thread_id,
                json!({ "title": title }),
            )
            .await
    }
}
