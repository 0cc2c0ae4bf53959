use crate::{db::DbPool, errors::ServiceError};
use async_trait::async_trait;
use std::sync::Arc;
use validator::ValidationError;

/// Command trait for implementing the Command Pattern
///
/// A command carries everything one write needs: it validates its own input,
/// checks the rows it references, and persists in a single transaction.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command against the given pool
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError>;
}

pub mod feedback;
pub mod issues;
pub mod users;

/// Rejects strings made only of whitespace.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Unwraps a field that validation has already required.
pub(crate) fn required<T: Clone>(value: &Option<T>, field: &str) -> Result<T, ServiceError> {
    value
        .clone()
        .ok_or_else(|| ServiceError::ValidationError(format!("{field} is required")))
}
