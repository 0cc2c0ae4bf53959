use crate::{
    commands::{users::RegisterUserCommand, Command},
    db::{integrity, DbPool, DeletionReport},
    entities::user::{self, Entity as User},
    errors::ServiceError,
    identity::{password, Principal, PrincipalProvider},
    schema,
};
use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Service for managing user accounts
#[derive(Clone, Debug)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    /// Creates a new user service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Registers a new user
    #[instrument(skip(self, command))]
    pub async fn register(&self, command: RegisterUserCommand) -> Result<user::Model, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    /// Gets a user by ID
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> Result<Option<user::Model>, ServiceError> {
        let user = User::find_by_id(user_id.to_string())
            .one(self.db_pool.as_ref())
            .await?;
        Ok(user)
    }

    /// Gets a user by user name
    #[instrument(skip(self))]
    pub async fn find_by_user_name(
        &self,
        user_name: &str,
    ) -> Result<Option<user::Model>, ServiceError> {
        let user = User::find()
            .filter(user::Column::UserName.eq(user_name))
            .one(self.db_pool.as_ref())
            .await?;
        Ok(user)
    }

    /// Lists all users, oldest first
    pub async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
        let users = User::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(users)
    }

    /// Returns the principal when `password` matches the stored credential.
    /// Unknown users and users without a credential never match.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(
        &self,
        user_name: &str,
        password: &str,
    ) -> Result<Option<Principal>, ServiceError> {
        let Some(user) = self.find_by_user_name(user_name).await? else {
            return Ok(None);
        };
        let Some(stored) = user.password_hash.as_deref() else {
            return Ok(None);
        };

        if password::verify_password(password, stored)? {
            Ok(Some(user.into()))
        } else {
            warn!("credential mismatch");
            Ok(None)
        }
    }

    /// Deletes a user. Fails with `IntegrityViolation` while any issue or
    /// feedback still references the user.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> Result<DeletionReport, ServiceError> {
        let report =
            integrity::delete_atomically(&self.db_pool, schema::USERS, user_id.to_string().into())
                .await?;
        info!(user_id, "User deleted");
        Ok(report)
    }
}

#[async_trait]
impl PrincipalProvider for UserService {
    async fn find_principal(&self, id: &str) -> Result<Option<Principal>, ServiceError> {
        Ok(self.get_user(id).await?.map(Principal::from))
    }
}
