use std::sync::Arc;

use husky_types::CollectionConfig;

use crate::dbs::qdrant::QdrantVectorStore;
use crate::error::{PersistError, Result};
use crate::traits::{CacheStore, DirectoryStore, DocumentStore, VectorStore};
use crate::PersistClient;

/// Assembles a [`PersistClient`].
///
/// Adapters passed in explicitly are used as-is. The remaining ones are
/// created from connection settings: MongoDB for cache, documents and the
/// directory (with the `mongodb` feature), Qdrant for vectors.
#[cfg_attr(not(feature = "mongodb"), allow(dead_code))]
pub struct PersistClientBuilder {
    collections: CollectionConfig,
    mongodb_uri: Option<String>,
    database: Option<String>,
    directory_database: Option<String>,
    qdrant_url: Option<String>,
    qdrant_api_key: Option<String>,
    vector_store: Option<Arc<dyn VectorStore>>,
    cache_store: Option<Arc<dyn CacheStore>>,
    document_store: Option<Arc<dyn DocumentStore>>,
    directory_store: Option<Arc<dyn DirectoryStore>>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self {
            collections: CollectionConfig::default(),
            mongodb_uri: None,
            database: None,
            directory_database: None,
            qdrant_url: None,
            qdrant_api_key: None,
            vector_store: None,
            cache_store: None,
            document_store: None,
            directory_store: None,
        }
    }

    pub fn collections(mut self, collections: CollectionConfig) -> Self {
        self.collections = collections;
        self
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    /// Database holding the directory tables, defaults to `database`
    pub fn directory_database(mut self, db: impl Into<String>) -> Self {
        self.directory_database = Some(db.into());
        self
    }

    pub fn qdrant_url(mut self, url: impl Into<String>) -> Self {
        self.qdrant_url = Some(url.into());
        self
    }

    pub fn qdrant_api_key(mut self, key: Option<String>) -> Self {
        self.qdrant_api_key = key;
        self
    }

    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = Some(store);
        self
    }

    pub fn document_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.document_store = Some(store);
        self
    }

    pub fn directory_store(mut self, store: Arc<dyn DirectoryStore>) -> Self {
        self.directory_store = Some(store);
        self
    }

    pub async fn build(mut self) -> Result<PersistClient> {
        // 1. Vector store: injected or Qdrant
        let vectors = match self.vector_store.take() {
            Some(store) => store,
            None => {
                let url = self.qdrant_url.take().ok_or_else(|| {
                    PersistError::Internal("qdrant_url or vector_store is required".to_string())
                })?;
                Arc::new(QdrantVectorStore::new(url, self.qdrant_api_key.as_deref())?)
            }
        };

        // 2. Mongo-backed adapters for whatever was not injected
        #[cfg(feature = "mongodb")]
        self.connect_mongo().await?;

        let cache = self
            .cache_store
            .ok_or_else(|| missing("cache_store"))?;
        let documents = self
            .document_store
            .ok_or_else(|| missing("document_store"))?;
        let directory = self
            .directory_store
            .ok_or_else(|| missing("directory_store"))?;

        Ok(PersistClient::new(
            &self.collections,
            vectors,
            cache,
            documents,
            directory,
        ))
    }

    #[cfg(feature = "mongodb")]
    async fn connect_mongo(&mut self) -> Result<()> {
        use crate::dbs::mongo::{self, MongoCacheStore, MongoDirectoryStore, MongoDocumentStore};

        let needs_mongo = self.cache_store.is_none()
            || self.document_store.is_none()
            || self.directory_store.is_none();
        if !needs_mongo {
            return Ok(());
        }

        let (Some(uri), Some(database)) = (self.mongodb_uri.as_deref(), self.database.as_deref())
        else {
            return Ok(());
        };

        let client = mongo::connect(uri).await?;
        tracing::info!(database, "Connected to MongoDB");

        if self.cache_store.is_none() {
            let cache = MongoCacheStore::new(&client, database, &self.collections.cache);
            cache.ensure_indexes().await?;
            self.cache_store = Some(Arc::new(cache));
        }
        if self.document_store.is_none() {
            let documents = MongoDocumentStore::new(&client, database);
            documents
                .ensure_key_index(&self.collections.threads, "threadId")
                .await?;
            self.document_store = Some(Arc::new(documents));
        }
        if self.directory_store.is_none() {
            let directory_db = self.directory_database.as_deref().unwrap_or(database);
            self.directory_store = Some(Arc::new(MongoDirectoryStore::new(&client, directory_db)));
        }
        Ok(())
    }
}

fn missing(what: &str) -> PersistError {
    PersistError::Internal(format!(
        "{} is required (inject one or configure MongoDB with the mongodb feature)",
        what
    ))
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
