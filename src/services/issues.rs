use crate::{
    commands::{
        issues::{ReportIssueCommand, ResolveIssueCommand, UpdateIssueCommand},
        Command,
    },
    db::{integrity, DbPool, DeletionReport},
    entities::{
        feedback,
        issue::{self, Entity as Issue},
    },
    errors::ServiceError,
    schema,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::{info, instrument};

/// Service for managing issues
#[derive(Clone, Debug)]
pub struct IssueService {
    db_pool: Arc<DbPool>,
}

impl IssueService {
    /// Creates a new issue service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Reports a new issue
    #[instrument(skip(self, command))]
    pub async fn report_issue(
        &self,
        command: ReportIssueCommand,
    ) -> Result<issue::Model, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    /// Edits an issue's description or category
    #[instrument(skip(self, command))]
    pub async fn update_issue(
        &self,
        command: UpdateIssueCommand,
    ) -> Result<issue::Model, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    /// Marks an issue resolved
    #[instrument(skip(self))]
    pub async fn resolve_issue(&self, issue_id: i32) -> Result<issue::Model, ServiceError> {
        ResolveIssueCommand { issue_id }
            .execute(self.db_pool.clone())
            .await
    }

    /// Gets an issue by ID
    #[instrument(skip(self))]
    pub async fn get_issue(&self, issue_id: i32) -> Result<Option<issue::Model>, ServiceError> {
        let issue = Issue::find_by_id(issue_id)
            .one(self.db_pool.as_ref())
            .await?;
        Ok(issue)
    }

    /// Gets an issue together with its feedback
    #[instrument(skip(self))]
    pub async fn get_issue_with_feedback(
        &self,
        issue_id: i32,
    ) -> Result<Option<(issue::Model, Vec<feedback::Model>)>, ServiceError> {
        let mut found = Issue::find_by_id(issue_id)
            .find_with_related(feedback::Entity)
            .order_by_asc(feedback::Column::SubmittedOn)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(found.pop())
    }

    /// Lists issues owned by a user, newest first, optionally by resolved state
    #[instrument(skip(self))]
    pub async fn list_issues_for_user(
        &self,
        owner_id: &str,
        resolved: Option<bool>,
    ) -> Result<Vec<issue::Model>, ServiceError> {
        let mut query = Issue::find().filter(issue::Column::ApplicationUserId.eq(owner_id));
        if let Some(resolved) = resolved {
            query = query.filter(issue::Column::IsResolved.eq(resolved));
        }

        let issues = query
            .order_by_desc(issue::Column::ReportedDate)
            .order_by_desc(issue::Column::Id)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(issues)
    }

    /// Deletes an issue and, in the same transaction, all of its feedback
    #[instrument(skip(self))]
    pub async fn delete_issue(&self, issue_id: i32) -> Result<DeletionReport, ServiceError> {
        let report =
            integrity::delete_atomically(&self.db_pool, schema::ISSUES, issue_id.into()).await?;
        info!(
            issue_id,
            feedback_removed = report.removed_from(schema::FEEDBACKS),
            "Issue deleted"
        );
        Ok(report)
    }
}
