//! Minimal identity surface: the fields of a user this crate needs, and
//! credential hashing. Sessions and authentication flows live elsewhere.

pub mod password;

use crate::entities::user;
use crate::errors::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The authenticated identity of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identifier, equal to `users.id`
    pub id: String,
    pub display_name: String,
}

impl From<user::Model> for Principal {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            display_name: model.user_name,
        }
    }
}

/// Resolves principals by identifier.
#[async_trait]
pub trait PrincipalProvider: Send + Sync {
    async fn find_principal(&self, id: &str) -> Result<Option<Principal>, ServiceError>;

    /// Like [`find_principal`](Self::find_principal), but a missing user is an error.
    async fn require_principal(&self, id: &str) -> Result<Principal, ServiceError> {
        self.find_principal(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn principal_uses_user_name_for_display() {
        let model = user::Model {
            id: "u-1".to_string(),
            user_name: "alice".to_string(),
            email: None,
            password_hash: None,
            created_at: Utc::now(),
        };

        let principal = Principal::from(model);
        assert_eq!(principal.id, "u-1");
        assert_eq!(principal.display_name, "alice");
    }
}
