use crate::{
    commands::{feedback::SubmitFeedbackCommand, Command},
    db::{integrity, DbPool, DeletionReport},
    entities::feedback::{self, Entity as Feedback},
    errors::ServiceError,
    schema,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::{info, instrument};

/// Service for tenant feedback on issues
#[derive(Clone, Debug)]
pub struct FeedbackService {
    db_pool: Arc<DbPool>,
}

impl FeedbackService {
    /// Creates a new feedback service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Submits feedback on an issue
    #[instrument(skip(self, command))]
    pub async fn submit_feedback(
        &self,
        command: SubmitFeedbackCommand,
    ) -> Result<feedback::Model, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    /// Gets feedback by ID
    #[instrument(skip(self))]
    pub async fn get_feedback(
        &self,
        feedback_id: i32,
    ) -> Result<Option<feedback::Model>, ServiceError> {
        let feedback = Feedback::find_by_id(feedback_id)
            .one(self.db_pool.as_ref())
            .await?;
        Ok(feedback)
    }

    /// Lists feedback on an issue in submission order
    #[instrument(skip(self))]
    pub async fn list_for_issue(
        &self,
        issue_id: i32,
    ) -> Result<Vec<feedback::Model>, ServiceError> {
        let feedback = Feedback::find()
            .filter(feedback::Column::IssueId.eq(issue_id))
            .order_by_asc(feedback::Column::SubmittedOn)
            .order_by_asc(feedback::Column::Id)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(feedback)
    }

    /// Lists feedback submitted by a tenant, newest first
    #[instrument(skip(self))]
    pub async fn list_by_tenant(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<feedback::Model>, ServiceError> {
        let feedback = Feedback::find()
            .filter(feedback::Column::TenantId.eq(tenant_id))
            .order_by_desc(feedback::Column::SubmittedOn)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(feedback)
    }

    /// Deletes a single feedback record
    #[instrument(skip(self))]
    pub async fn delete_feedback(&self, feedback_id: i32) -> Result<DeletionReport, ServiceError> {
        let report =
            integrity::delete_atomically(&self.db_pool, schema::FEEDBACKS, feedback_id.into())
                .await?;
        info!(feedback_id, "Feedback deleted");
        Ok(report)
    }
}
