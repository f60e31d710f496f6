mod cache;
mod directory;
mod document;

pub use cache::MongoCacheStore;
pub use directory::MongoDirectoryStore;
pub use document::MongoDocumentStore;

use bson::{Bson, Document};
use mongodb::Client;
use serde_json::Value;

use crate::error::{PersistError, Result};

/// Connect to MongoDB
pub async fn connect(mongodb_uri: &str) -> Result<Client> {
    Client::with_uri_str(mongodb_uri)
        .await
        .map_err(|e| PersistError::Connection(e.to_string()))
}

/// BSON document to plain JSON, without the Mongo `_id`
pub(crate) fn document_to_json(mut document: Document) -> Value {
    document.remove("_id");
    Bson::Document(document).into_relaxed_extjson()
}
