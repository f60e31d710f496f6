use std::sync::Arc;

use anyhow::Result;
use husky_persist::{FeedbackRecord, FeedbackRepository};
use husky_types::FeedbackRequest;

use crate::identity::IdentityLookup;

fn missing(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Records ratings of answers, attributing them to a directory member when
/// the request only carries an email
pub struct FeedbackService {
    repository: FeedbackRepository,
    identity: Arc<dyn IdentityLookup>,
}

impl FeedbackService {
    pub fn new(repository: FeedbackRepository, identity: Arc<dyn IdentityLookup>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    async fn enrich(&self, mut request: FeedbackRequest) -> FeedbackRequest {
        let Some(email) = request.email.clone().filter(|e| !e.trim().is_empty()) else {
            return request;
        };
        if !(missing(&request.name) || missing(&request.directory_id) || missing(&request.team)) {
            return request;
        }

        match self.identity.find_member_by_email(&email).await {
            Ok(Some(member)) => {
                if missing(&request.name) {
                    request.name = member.name;
                }
                if missing(&request.directory_id) {
                    request.directory_id = Some(member.uid);
                }
                if missing(&request.team) {
                    request.team = member.team;
                }
            }
            Ok(None) => tracing::debug!(email = %email, "No member for feedback email"),
            Err(e) => tracing::warn!(email = %email, error = %e, "Identity lookup failed, storing feedback as sent"),
        }
        request
    }

    /// Store one immutable feedback record
    pub async fn submit(&self, request: FeedbackRequest) -> Result<FeedbackRecord> {
        let record = FeedbackRecord::from(self.enrich(request).await);

        if let Err(e) = self.repository.create(&record).await {
            tracing::error!(feedback_id = %record.id, error = %e, "Failed to store feedback");
            return Err(e.into());
        }

        tracing::info!(feedback_id = %record.id, rating = record.rating, "Feedback stored");
        Ok(record)
    }
}
