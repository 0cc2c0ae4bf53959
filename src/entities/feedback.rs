use crate::errors::ServiceError;
use crate::schema::{COMMENT_MAX_LEN, RATING_MAX, RATING_MIN};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

/// A tenant's rating and comment on an issue. Never updated after insert.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feedbacks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Removed together with the issue
    pub issue_id: i32,
    /// Submitting user; deleting that user is restricted while this row exists
    pub tenant_id: String,
    #[sea_orm(column_type = "String(StringLen::N(500))")]
    pub comment: String,
    pub rating: i32,
    pub submitted_on: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::issue::Entity",
        from = "Column::IssueId",
        to = "super::issue::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Issue,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TenantId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Tenant,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Last line of defence for writes that bypass the submit command.
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            return Err(ServiceError::rejected_write("feedback cannot be modified"));
        }

        if let ActiveValue::Set(comment) = &self.comment {
            if comment.trim().is_empty() || comment.chars().count() > COMMENT_MAX_LEN {
                return Err(ServiceError::rejected_write(format!(
                    "comment must be 1 to {COMMENT_MAX_LEN} characters"
                )));
            }
        }

        if let ActiveValue::Set(rating) = &self.rating {
            if !(RATING_MIN..=RATING_MAX).contains(rating) {
                return Err(ServiceError::rejected_write(format!(
                    "rating must be between {RATING_MIN} and {RATING_MAX}"
                )));
            }
        }

        Ok(self)
    }
}
