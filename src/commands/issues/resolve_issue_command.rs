use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::issue::{self, Entity as Issue},
    errors::ServiceError,
};
use async_trait::async_trait;
use metrics::counter;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Marks an issue resolved. Resolving a resolved issue is a no-op.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResolveIssueCommand {
    pub issue_id: i32,
}

#[async_trait]
impl Command for ResolveIssueCommand {
    type Result = issue::Model;

    #[instrument(skip(self, db_pool), fields(issue_id = self.issue_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        let txn = db_pool.begin().await?;
        let existing = Issue::find_by_id(self.issue_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("issue {} not found", self.issue_id)))?;

        if existing.is_resolved {
            debug!("Issue already resolved");
            return Ok(existing);
        }

        let mut active: issue::ActiveModel = existing.into();
        active.is_resolved = Set(true);
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        counter!("tenant_issue_tracker.issues.resolved", 1);
        info!("Issue resolved");
        Ok(updated)
    }
}
