#![allow(dead_code)]

use std::sync::Arc;

use tenant_issue_tracker::{
    commands::{feedback::SubmitFeedbackCommand, issues::ReportIssueCommand, users::RegisterUserCommand},
    db::{self, DbConfig, DbPool},
    entities::{feedback, issue, user},
    schema, AppServices,
};

/// Helper harness backed by a fresh, migrated in-memory SQLite database.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub services: AppServices,
}

impl TestDb {
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory())
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let pool = Arc::new(pool);
        let services = AppServices::new(pool.clone());
        Self { pool, services }
    }

    pub async fn user(&self, user_name: &str) -> user::Model {
        self.services
            .users
            .register(RegisterUserCommand::new(user_name))
            .await
            .expect("failed to register user")
    }

    pub async fn issue(&self, owner: &user::Model, description: &str) -> issue::Model {
        self.services
            .issues
            .report_issue(ReportIssueCommand::new(&owner.id, description, "maintenance"))
            .await
            .expect("failed to report issue")
    }

    pub async fn feedback(
        &self,
        issue: &issue::Model,
        tenant: &user::Model,
        rating: i32,
    ) -> feedback::Model {
        self.services
            .feedback
            .submit_feedback(SubmitFeedbackCommand::new(
                issue.id,
                &tenant.id,
                "Thanks for the quick fix",
                rating,
            ))
            .await
            .expect("failed to submit feedback")
    }

    /// Row count of every table, in definition order.
    pub async fn counts(&self) -> Vec<(&'static str, u64)> {
        schema::row_counts(self.pool.as_ref())
            .await
            .expect("failed to count rows")
    }

    pub async fn count(&self, table: &str) -> u64 {
        self.counts()
            .await
            .into_iter()
            .find(|(name, _)| *name == table)
            .map(|(_, rows)| rows)
            .expect("unknown table")
    }
}
