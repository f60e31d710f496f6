use std::sync::Arc;

use crate::error::{PersistError, Result};
use crate::models::FeedbackRecord;
use crate::traits::DocumentStore;

/// Append-only feedback log
#[derive(Clone)]
pub struct FeedbackRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl FeedbackRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub async fn create(&self, record: &FeedbackRecord) -> Result<()> {
        self.store
            .create(&self.collection, serde_json::to_value(record)?)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Vec<FeedbackRecord>> {
        self.store
            .find_many_by_key(&self.collection, "email", email)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(PersistError::from))
            .collect()
    }
}
