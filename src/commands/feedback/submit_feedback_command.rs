use crate::commands::{not_blank, required, Command};
use crate::{
    db::{ensure_references, DbPool},
    entities::feedback,
    errors::ServiceError,
    schema,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{ActiveModelTrait, NotSet, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::Validate;

/// A tenant rates and comments on an issue.
///
/// Ratings run from 1 (worst) to 5 (best); comments hold at most 500 characters.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitFeedbackCommand {
    #[validate(required)]
    pub issue_id: Option<i32>,
    #[validate(required, length(min = 1, message = "Tenant id cannot be empty"))]
    pub tenant_id: Option<String>,
    #[validate(
        required,
        length(min = 1, max = 500, message = "Comment must be between 1 and 500 characters"),
        custom = "not_blank"
    )]
    pub comment: Option<String>,
    #[validate(required, range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[validate(required)]
    pub submitted_on: Option<DateTime<Utc>>,
}

impl SubmitFeedbackCommand {
    /// Feedback submitted now.
    pub fn new(
        issue_id: i32,
        tenant_id: impl Into<String>,
        comment: impl Into<String>,
        rating: i32,
    ) -> Self {
        Self {
            issue_id: Some(issue_id),
            tenant_id: Some(tenant_id.into()),
            comment: Some(comment.into()),
            rating: Some(rating),
            submitted_on: Some(Utc::now()),
        }
    }

    fn to_active_model(&self) -> Result<feedback::ActiveModel, ServiceError> {
        Ok(feedback::ActiveModel {
            id: NotSet,
            issue_id: Set(required(&self.issue_id, "issue_id")?),
            tenant_id: Set(required(&self.tenant_id, "tenant_id")?),
            comment: Set(required(&self.comment, "comment")?),
            rating: Set(required(&self.rating, "rating")?),
            submitted_on: Set(required(&self.submitted_on, "submitted_on")?),
        })
    }
}

#[async_trait]
impl Command for SubmitFeedbackCommand {
    type Result = feedback::Model;

    #[instrument(skip(self, db_pool), fields(issue_id = ?self.issue_id, tenant_id = ?self.tenant_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            counter!("tenant_issue_tracker.feedback.rejected", 1);
            error!("Invalid feedback: {}", e);
            ServiceError::from(e)
        })?;
        let active = self.to_active_model()?;
        let issue_id = required(&self.issue_id, "issue_id")?;
        let tenant_id = required(&self.tenant_id, "tenant_id")?;

        let txn = db_pool.begin().await?;
        ensure_references(
            &txn,
            schema::FEEDBACKS,
            &[("issue_id", issue_id.into()), ("tenant_id", tenant_id.into())],
        )
        .await?;
        let result = active.insert(&txn).await?;
        txn.commit().await?;

        counter!("tenant_issue_tracker.feedback.submitted", 1);
        info!(
            feedback_id = result.id,
            rating = result.rating,
            "Feedback submitted"
        );

        Ok(result)
    }
}
