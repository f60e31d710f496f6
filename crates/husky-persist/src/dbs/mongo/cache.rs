use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use crate::error::Result;
use crate::traits::CacheStore;

/// Cache entries `{_id, value, expires_at}` with a TTL index on `expires_at`.
///
/// Reads filter on `expires_at` as well, since the TTL monitor only runs
/// about once a minute.
#[derive(Clone)]
pub struct MongoCacheStore {
    collection: Collection<Document>,
}

impl MongoCacheStore {
    pub fn new(client: &Client, db_name: &str, collection: &str) -> Self {
        Self {
            collection: client.database(db_name).collection(collection),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(IndexOptions::builder().expire_after(Duration::ZERO).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MongoCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let filter = doc! {
            "_id": key,
            "expires_at": { "$gt": bson::DateTime::now() }
        };
        let entry = self.collection.find_one(filter).await?;
        Ok(entry.and_then(|d| d.get_str("value").ok().map(str::to_string)))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = bson::DateTime::from_system_time(SystemTime::now() + ttl);
        self.collection
            .update_one(
                doc! { "_id": key },
                doc! { "$set": { "value": value, "expires_at": expires_at } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }
}
