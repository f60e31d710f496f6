use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Client, Database};
use serde_json::Value;

use super::document_to_json;
use crate::error::Result;
use crate::traits::DocumentStore;

#[derive(Clone)]
pub struct MongoDocumentStore {
    database: Database,
}

impl MongoDocumentStore {
    pub fn new(client: &Client, db_name: &str) -> Self {
        Self {
            database: client.database(db_name),
        }
    }

    /// Unique index on the key field of a collection
    pub async fn ensure_key_index(&self, collection: &str, key: &str) -> Result<()> {
        let index = mongodb::IndexModel::builder()
            .keys(doc! { key: 1 })
            .options(mongodb::options::IndexOptions::builder().unique(true).build())
            .build();
        self.database
            .collection::<Document>(collection)
            .create_index(index)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn create(&self, collection: &str, document: Value) -> Result<()> {
        let document = bson::to_document(&document)?;
        self.database
            .collection::<Document>(collection)
            .insert_one(document)
            .await?;
        Ok(())
    }

    async fn find_one_by_key(
        &self,
        collection: &str,
        key: &str,
        value: &str,
    ) -> Result<Option<Value>> {
        let found = self
            .database
            .collection::<Document>(collection)
            .find_one(doc! { key: value })
            .await?;
        Ok(found.map(document_to_json))
    }

    async fn find_many_by_key(
        &self,
        collection: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<Value>> {
        let documents: Vec<Document> = self
            .database
            .collection::<Document>(collection)
            .find(doc! { key: value })
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(document_to_json).collect())
    }

    async fn update_by_key(
        &self,
        collection: &str,
        key: &str,
        value: &str,
        update: Value,
    ) -> Result<bool> {
        let fields = bson::to_document(&update)?;
        let result = self
            .database
            .collection::<Document>(collection)
            .update_one(doc! { key: value }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
