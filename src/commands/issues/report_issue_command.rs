use crate::commands::{not_blank, required, Command};
use crate::{
    db::{ensure_references, DbPool},
    entities::issue,
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

/// Records a new issue owned by `owner_id`.
///
/// Fields are optional so a partially filled request (for example one
/// deserialized from an outer layer) is rejected by validation rather than by
/// the type system.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportIssueCommand {
    #[validate(length(min = 1, message = "Owner id cannot be empty"))]
    pub owner_id: String,
    #[validate(
        required,
        length(min = 1, message = "Description cannot be empty"),
        custom = "not_blank"
    )]
    pub description: Option<String>,
    #[validate(
        required,
        length(min = 1, message = "Category cannot be empty"),
        custom = "not_blank"
    )]
    pub category: Option<String>,
    #[validate(required)]
    pub reported_date: Option<DateTime<Utc>>,
    #[validate(required)]
    pub is_resolved: Option<bool>,
}

impl ReportIssueCommand {
    /// An open issue reported now.
    pub fn new(
        owner_id: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            description: Some(description.into()),
            category: Some(category.into()),
            reported_date: Some(Utc::now()),
            is_resolved: Some(false),
        }
    }

    fn to_active_model(&self) -> Result<issue::ActiveModel, ServiceError> {
        Ok(issue::ActiveModel {
            id: NotSet,
            description: Set(required(&self.description, "description")?),
            category: Set(required(&self.category, "category")?),
            reported_date: Set(required(&self.reported_date, "reported_date")?),
            is_resolved: Set(required(&self.is_resolved, "is_resolved")?),
            application_user_id: Set(self.owner_id.clone()),
        })
    }
}

#[async_trait]
impl Command for ReportIssueCommand {
    type Result = issue::Model;

    #[instrument(skip(self, db_pool), fields(owner_id = %self.owner_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            counter!("tenant_issue_tracker.issues.rejected", 1);
            error!("Invalid issue report: {}", e);
            ServiceError::from(e)
        })?;
        let active = self.to_active_model()?;

        let txn = db_pool.begin().await?;
        ensure_references(
            &txn,
            schema::ISSUES,
            &[("application_user_id", self.owner_id.clone().into())],
        )
        .await?;
        let result = active.insert(&txn).await?;
        txn.commit().await?;

        counter!("tenant_issue_tracker.issues.reported", 1);
        info!(
            issue_id = result.id,
            category = %result.category,
            "Issue reported"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_report_command() {
        let valid = ReportIssueCommand::new("u-1", "Heating is broken", "maintenance");
        assert!(valid.validate().is_ok());
        assert!(valid.to_active_model().is_ok());

        let mut missing_description = valid.clone();
        missing_description.description = None;
        let errors = missing_description.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));

        let mut blank_category = valid.clone();
        blank_category.category = Some("   ".to_string());
        assert!(blank_category.validate().is_err());

        let mut missing_date = valid.clone();
        missing_date.reported_date = None;
        assert!(missing_date.validate().is_err());

        let mut missing_flag = valid;
        missing_flag.is_resolved = None;
        assert!(missing_flag.validate().is_err());
    }
}
