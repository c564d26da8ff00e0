//! # Golden Hearts Database Layer
//!
//! SQLite-based persistence layer with sqlx for volunteers, organizations,
//! opportunities and the records hanging off them (applications, volunteer
//! history, achievements, reviews).
//!
//! ## Modules
//!
//! - [`pool`] - Database connection pool and migrations
//! - [`models`] - Row types and API-facing entities
//! - [`users`] - User repository
//! - [`organizations`] - Organization repository
//! - [`opportunities`] - Opportunity repository
//! - [`error`] - Database error types

/// Module version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod error;
pub mod models;
pub mod opportunities;
pub mod organizations;
pub mod pool;
pub mod users;

// Re-exports
pub use error::DbError;
pub use opportunities::OpportunityRepo;
pub use organizations::OrganizationRepo;
pub use pool::DbPool;
pub use users::UserRepo;

/// Result type alias
pub type Result<T> = std::result::Result<T, DbError>;
