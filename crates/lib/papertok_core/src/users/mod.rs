//! User record storage.
//!
//! [`UserStore`] is the contract the auth flows depend on. The server picks
//! [`PgUserStore`] when a database is configured and [`MemoryUserStore`]
//! otherwise; nothing downstream branches on which one it got.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::{NewUser, UserRecord};

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// User store errors.
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("user not found")]
    NotFound,

    #[error("user already exists")]
    AlreadyExists,

    #[error("invalid user id: {0}")]
    InvalidId(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for user store operations.
pub type Result<T> = std::result::Result<T, UserStoreError>;

/// Persistent user records keyed by id, unique on username and email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; the store assigns id and timestamps.
    async fn create(&self, user: NewUser) -> Result<UserRecord>;

    async fn find_by_email(&self, email: &str) -> Result<UserRecord>;

    async fn find_by_username(&self, username: &str) -> Result<UserRecord>;

    async fn find_by_id(&self, id: i64) -> Result<UserRecord>;

    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    async fn exists_by_username(&self, username: &str) -> Result<bool>;
}
