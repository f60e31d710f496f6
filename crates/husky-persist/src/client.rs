use std::sync::Arc;

use husky_types::CollectionConfig;

use crate::repositories::{FeedbackRepository, ThreadRepository};
use crate::traits::{CacheStore, DirectoryStore, DocumentStore, VectorStore};

/// The storage adapters of one deployment, plus typed repositories
#[derive(Clone)]
pub struct PersistClient {
    vectors: Arc<dyn VectorStore>,
    cache: Arc<dyn CacheStore>,
    documents: Arc<dyn DocumentStore>,
    directory: Arc<dyn DirectoryStore>,
    thread_repo: ThreadRepository,
    feedback_repo: FeedbackRepository,
}

impl PersistClient {
    pub fn new(
        collections: &CollectionConfig,
        vectors: Arc<dyn VectorStore>,
        cache: Arc<dyn CacheStore>,
        documents: Arc<dyn DocumentStore>,
        directory: Arc<dyn DirectoryStore>,
    ) -> Self {
        let thread_repo = ThreadRepository::new(documents.clone(), collections.threads.clone());
        let feedback_repo =
            FeedbackRepository::new(documents.clone(), collections.feedback.clone());

        Self {
            vectors,
            cache,
            documents,
            directory,
            thread_repo,
            feedback_repo,
        }
    }

    pub fn vectors(&self) -> Arc<dyn VectorStore> {
        self.vectors.clone()
    }

    pub fn cache(&self) -> Arc<dyn CacheStore> {
        self.cache.clone()
    }

    pub fn documents(&self) -> Arc<dyn DocumentStore> {
        self.documents.clone()
    }

    pub fn directory(&self) -> Arc<dyn DirectoryStore> {
        self.directory.clone()
    }

    pub fn threads(&self) -> &ThreadRepository {
        &self.thread_repo
    }

    pub fn feedback(&self) -> &FeedbackRepository {
        &self.feedback_repo
    }
}
