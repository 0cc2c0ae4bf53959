use crate::commands::{not_blank, Command};
use crate::{
    db::DbPool,
    entities::user::{self, Entity as User},
    errors::ServiceError,
    identity::password,
};
use async_trait::async_trait;
use metrics::counter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserCommand {
    #[validate(
        length(min = 1, max = 256, message = "User name must be between 1 and 256 characters"),
        custom = "not_blank"
    )]
    pub user_name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    #[serde(skip_serializing)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

impl RegisterUserCommand {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            email: None,
            password: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

#[async_trait]
impl Command for RegisterUserCommand {
    type Result = user::Model;

    #[instrument(skip(self, db_pool), fields(user_name = %self.user_name))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let db = db_pool.as_ref();

        let taken = User::find()
            .filter(user::Column::UserName.eq(self.user_name.as_str()))
            .one(db)
            .await?;
        if taken.is_some() {
            warn!("user name already registered");
            return Err(ServiceError::Conflict(format!(
                "user name {} is already taken",
                self.user_name
            )));
        }

        let password_hash = self
            .password
            .as_deref()
            .map(password::hash_password)
            .transpose()?;

        // id and created_at are filled in by the entity on insert
        let user = user::ActiveModel {
            user_name: Set(self.user_name.clone()),
            email: Set(self.email.clone()),
            password_hash: Set(password_hash),
            ..Default::default()
        };

        let result = user.insert(db).await?;

        counter!("tenant_issue_tracker.users.registered", 1);
        info!(user_id = %result.id, "User registered");

        Ok(result)
    }
}
