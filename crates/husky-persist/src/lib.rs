pub mod builder;
pub mod client;
pub mod dbs;
pub mod error;
pub mod filter;
pub mod models;
pub mod repositories;
pub mod traits;

pub use builder::PersistClientBuilder;
pub use client::PersistClient;
pub use dbs::memory::{
    InMemoryCacheStore, InMemoryDirectoryStore, InMemoryDocumentStore, InMemoryVectorStore,
};
pub use dbs::qdrant::QdrantVectorStore;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::{MongoCacheStore, MongoDirectoryStore, MongoDocumentStore};
pub use error::{PersistError, Result};
pub use filter::{DirectoryEntity, DirectoryQuery, Filter, OrderBy, SortDirection, SortKey};
pub use models::{FeedbackRecord, ThreadDescriptor, ThreadRecord, Turn};
pub use repositories::{FeedbackRepository, ThreadRepository};
pub use traits::{CacheStore, DirectoryStore, DocumentStore, ScoredPoint, VectorStore};
