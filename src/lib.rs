//! Tenant Issue Tracker
//!
//! Persistence layer for a multi-tenant issue tracker: users report issues,
//! tenants leave feedback on them, and referential integrity between the
//! three is enforced on every write.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod migrator;
pub mod schema;
pub mod services;

pub use errors::ServiceError;
pub use services::AppServices;
