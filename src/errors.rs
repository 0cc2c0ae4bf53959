use sea_orm::error::{DbErr, SqlErr};

/// Prefix of the `DbErr::Custom` message raised when an entity refuses a write.
const REJECTED_WRITE: &str = "rejected write: ";

/// Errors surfaced by every persistence operation in the crate.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A delete blocked by a restricting relationship, or a write whose
    /// foreign key does not resolve to an existing row.
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        ServiceError::db_error(err)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Classifies a storage error. Constraint violations reported by the
    /// database are lifted into their domain variants so callers see the same
    /// error whether the application check or the foreign key caught it.
    ///
    /// Writes refused by an entity's `before_save` hook become
    /// `ValidationError`.
    pub fn db_error(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                ServiceError::IntegrityViolation(msg)
            }
            Some(SqlErr::UniqueConstraintViolation(msg)) => ServiceError::Conflict(msg),
            _ => match err {
                DbErr::RecordNotFound(msg) => ServiceError::NotFound(msg),
                DbErr::Custom(msg) => match msg.strip_prefix(REJECTED_WRITE) {
                    Some(reason) => ServiceError::ValidationError(reason.to_string()),
                    None => ServiceError::DatabaseError(DbErr::Custom(msg)),
                },
                other => ServiceError::DatabaseError(other),
            },
        }
    }

    /// The error an entity `before_save` hook returns to refuse a write.
    pub fn rejected_write(reason: impl std::fmt::Display) -> DbErr {
        DbErr::Custom(format!("{REJECTED_WRITE}{reason}"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, ServiceError::IntegrityViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "name cannot be empty"))]
        name: String,
    }

    #[test]
    fn validation_errors_become_validation_variant() {
        let err = Sample {
            name: String::new(),
        }
        .validate()
        .unwrap_err();

        let service_err = ServiceError::from(err);
        assert_matches!(service_err, ServiceError::ValidationError(ref msg) if msg.contains("name"));
    }

    #[test]
    fn record_not_found_maps_to_not_found() {
        let err = ServiceError::from(DbErr::RecordNotFound("issue 7".to_string()));
        assert!(err.is_not_found());
    }

    #[test]
    fn rejected_writes_map_to_validation_errors() {
        let err = ServiceError::from(ServiceError::rejected_write("rating must be between 1 and 5"));
        assert_matches!(err, ServiceError::ValidationError(ref msg) if msg == "rating must be between 1 and 5");
    }

    #[test]
    fn plain_db_errors_stay_database_errors() {
        let err = ServiceError::from(DbErr::Custom("boom".to_string()));
        assert_matches!(err, ServiceError::DatabaseError(_));
        assert!(!err.is_integrity_violation());
    }
}
