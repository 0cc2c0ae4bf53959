use crate::db::DbPool;
use std::sync::Arc;

pub mod feedback;
pub mod issues;
pub mod users;

pub use feedback::FeedbackService;
pub use issues::IssueService;
pub use users::UserService;

/// Every service, sharing one connection pool.
#[derive(Clone, Debug)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub issues: Arc<IssueService>,
    pub feedback: Arc<FeedbackService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            users: Arc::new(UserService::new(db_pool.clone())),
            issues: Arc::new(IssueService::new(db_pool.clone())),
            feedback: Arc::new(FeedbackService::new(db_pool)),
        }
    }
}
