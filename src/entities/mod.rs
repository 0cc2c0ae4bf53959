//! sea-orm entities for the persisted tables.
//!
//! Relations are declared for typed joins; delete behaviour is enforced by
//! [`crate::db::integrity`] and the migration foreign keys, not by the ORM.

pub mod feedback;
pub mod issue;
pub mod user;

pub use feedback::Entity as Feedback;
pub use issue::Entity as Issue;
pub use user::Entity as User;
