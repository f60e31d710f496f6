use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use husky_persist::{DirectoryEntity, DirectoryQuery, DirectoryStore, Filter};
use serde::{Deserialize, Serialize};

use crate::tools::format::field;

/// Who a directory member is, as far as feedback attribution goes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberIdentity {
    pub uid: String,
    pub name: Option<String>,
    pub email: String,
    /// First team the member belongs to
    pub team: Option<String>,
}

#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn find_member_by_email(&self, email: &str) -> Result<Option<MemberIdentity>>;
}

/// Member lookup over the directory tables
pub struct DirectoryIdentityLookup {
    directory: Arc<dyn DirectoryStore>,
}

impl DirectoryIdentityLookup {
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl IdentityLookup for DirectoryIdentityLookup {
    async fn find_member_by_email(&self, email: &str) -> Result<Option<MemberIdentity>> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Ok(None);
        }

        let query = DirectoryQuery::new(DirectoryEntity::Members)
            .filter(Filter::equals_ignore_case("email", email.as_str()))
            .limit(1);
        let rows = self.directory.query(query).await?;

        Ok(rows.first().and_then(|row| {
            Some(MemberIdentity {
                uid: field(row, "uid")?,
                name: field(row, "name"),
                email: email.clone(),
                team: field(row, "teams.name"),
            })
        }))
    }
}
