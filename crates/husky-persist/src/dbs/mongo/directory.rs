use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Client, Database};
use serde_json::Value;

use super::document_to_json;
use crate::error::Result;
use crate::filter::{DirectoryQuery, SORT_FIELD};
use crate::traits::DirectoryStore;

/// Directory tables as MongoDB collections of denormalized rows
#[derive(Clone)]
pub struct MongoDirectoryStore {
    database: Database,
}

impl MongoDirectoryStore {
    pub fn new(client: &Client, db_name: &str) -> Self {
        Self {
            database: client.database(db_name),
        }
    }

    fn pipeline(query: &DirectoryQuery) -> Result<Vec<Document>> {
        let mut pipeline = vec![doc! { "$match": query.filter.to_document()? }];

        if let Some(order_by) = &query.order_by {
            if let Some(stage) = order_by.add_fields_stage() {
                pipeline.push(stage);
            }
            pipeline.push(doc! { "$sort": order_by.sort_document() });
        }
        if let Some(limit) = query.limit {
            pipeline.push(doc! { "$limit": limit as i64 });
        }
        pipeline.push(doc! { "$project": { SORT_FIELD: 0 } });

        Ok(pipeline)
    }
}

#[async_trait]
impl DirectoryStore for MongoDirectoryStore {
    async fn query(&self, query: DirectoryQuery) -> Result<Vec<Value>> {
        let pipeline = Self::pipeline(&query)?;
        tracing::debug!(
            entity = query.entity.collection_name(),
            stages = pipeline.len(),
            "Running directory query"
        );

        let rows: Vec<Document> = self
            .database
            .collection::<Document>(query.entity.collection_name())
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;

        Ok(rows.into_iter().map(document_to_json).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DirectoryEntity, Filter, OrderBy};

    #[test]
    fn test_pipeline_shape() {
        let query = DirectoryQuery::new(DirectoryEntity::FocusAreas)
            .filter(Filter::contains("title", "AI"))
            .order_by(OrderBy::count_desc("teams"))
            .limit(10);

        let pipeline = MongoDirectoryStore::pipeline(&query).unwrap();
        assert_eq!(pipeline.len(), 5);
        assert!(pipeline[0].contains_key("$match"));
        assert!(pipeline[1].contains_key("$addFields"));
        assert_eq!(
            pipeline[2].get_document("$sort").unwrap(),
            &doc! { SORT_FIELD: -1, "uid": 1 }
        );
        assert_eq!(pipeline[3], doc! { "$limit": 10_i64 });
    }

    #[test]
    fn test_contains_translates_to_escaped_case_insensitive_regex() {
        let document = Filter::contains("name", "a.b (c)").to_document().unwrap();
        assert_eq!(
            document,
            doc! { "name": { "$regex": "a\\.b \\(c\\)", "$options": "i" } }
        );
    }

    #[test]
    fn test_equals_ignore_case_translates_to_anchored_regex() {
        let document = Filter::equals_ignore_case("email", "alice@example.com")
            .to_document()
            .unwrap();
        assert_eq!(
            document,
            doc! { "email": { "$regex": "^alice@example\\.com$", "$options": "i" } }
        );
    }

    #[test]
    fn test_composite_filter_translation() {
        let filter = Filter::and(vec![
            Filter::any_contains(&["name", "bio"], "alice"),
            Filter::is_set("officeHours", true),
            Filter::gte("startDate", "2024-01-01"),
        ]);

        let document = filter.to_document().unwrap();
        let clauses = document.get_array("$and").unwrap();
        assert_eq!(clauses.len(), 3);
        assert_eq!(
            clauses[1].as_document().unwrap(),
            &doc! { "officeHours": { "$ne": bson::Bson::Null } }
        );
        assert_eq!(
            clauses[2].as_document().unwrap(),
            &doc! { "startDate": { "$gte": "2024-01-01" } }
        );
    }

    #[test]
    fn test_match_all_is_empty_document() {
        assert!(Filter::All.to_document().unwrap().is_empty());
    }
}
