use crate::commands::{not_blank, Command};
use crate::{
    db::DbPool,
    entities::issue::{self, Entity as Issue},
    errors::ServiceError,
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

/// Edits the description and/or category of an issue. Absent fields are left alone.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateIssueCommand {
    pub issue_id: i32,
    #[validate(
        length(min = 1, message = "Description cannot be empty"),
        custom = "not_blank"
    )]
    pub description: Option<String>,
    #[validate(
        length(min = 1, message = "Category cannot be empty"),
        custom = "not_blank"
    )]
    pub category: Option<String>,
}

#[async_trait]
impl Command for UpdateIssueCommand {
    type Result = issue::Model;

    #[instrument(skip(self, db_pool), fields(issue_id = self.issue_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        if self.description.is_none() && self.category.is_none() {
            return Err(ServiceError::ValidationError(
                "nothing to update: provide a description or a category".to_string(),
            ));
        }

        let txn = db_pool.begin().await?;
        let existing = Issue::find_by_id(self.issue_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("issue {} not found", self.issue_id)))?;

        let mut active: issue::ActiveModel = existing.into();
        if let Some(description) = &self.description {
            active.description = Set(description.clone());
        }
        if let Some(category) = &self.category {
            active.category = Set(category.clone());
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!("Issue updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_update_command() {
        let update = UpdateIssueCommand {
            issue_id: 1,
            description: Some("Now leaking".to_string()),
            category: None,
        };
        assert!(update.validate().is_ok());

        let blank = UpdateIssueCommand {
            issue_id: 1,
            description: Some(" ".to_string()),
            category: None,
        };
        assert!(blank.validate().is_err());
    }
}
