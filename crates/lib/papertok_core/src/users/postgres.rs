//! PostgreSQL-backed user store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{Result, UserStore, UserStoreError};
use crate::models::auth::{NewUser, UserRecord};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

type UserRow = (i64, String, String, String, DateTime<Utc>, DateTime<Utc>);

fn from_row(row: UserRow) -> UserRecord {
    let (id, username, email, password_hash, created_at, updated_at) = row;
    UserRecord {
        id,
        username,
        email,
        password_hash,
        created_at,
        updated_at,
    }
}

fn map_insert_error(err: sqlx::Error) -> UserStoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => UserStoreError::AlreadyExists,
        _ => UserStoreError::Database(err),
    }
}

/// [`UserStore`] over the `users` table created by [`crate::migrate`].
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<UserRecord> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(from_row).ok_or(UserStoreError::NotFound)
    }

    async fn exists(&self, column: &str, value: &str) -> Result<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM users WHERE {column} = $1)");
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)?;
        Ok(from_row(row))
    }

    async fn find_by_email(&self, email: &str) -> Result<UserRecord> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<UserRecord> {
        self.find_one("username", username).await
    }

    async fn find_by_id(&self, id: i64) -> Result<UserRecord> {
        if id <= 0 {
            return Err(UserStoreError::InvalidId(id));
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(from_row).ok_or(UserStoreError::NotFound)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        self.exists("email", email).await
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        self.exists("username", username).await
    }
}
