//! MySQL user repository implementation.

use super::parse_id;
use crate::{traits::UserRepository, DatabasePool};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emporium_core::{Email, EmporiumError, EmporiumResult, User, UserId, UserRole};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// MySQL user repository implementation.
#[derive(Clone)]
pub struct MySqlUserRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlUserRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = EmporiumError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_id(&row.id)?,
            username: row.username,
            email: Email::new_unchecked(row.email),
            role: UserRole::parse(&row.role).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_USER: &str = "SELECT id, username, email, role, created_at, updated_at FROM users";

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: UserId) -> EmporiumResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> EmporiumResult<Option<User>> {
        debug!("Finding user by username: {}", username);

        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE username = ?"))
            .bind(username)
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> EmporiumResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let row =
            sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE LOWER(email) = LOWER(?)"))
                .bind(email)
                .fetch_optional(self.pool.inner())
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn exists_by_username(&self, username: &str) -> EmporiumResult<bool> {
        let result: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM users WHERE username = ? LIMIT 1")
                .bind(username)
                .fetch_optional(self.pool.inner())
                .await?;

        Ok(result.is_some())
    }

    async fn exists_by_email(&self, email: &str) -> EmporiumResult<bool> {
        let result: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM users WHERE LOWER(email) = LOWER(?) LIMIT 1")
                .bind(email)
                .fetch_optional(self.pool.inner())
                .await?;

        Ok(result.is_some())
    }

    async fn save(&self, user: &User) -> EmporiumResult<User> {
        debug!("Saving user: {}", user.username);

        sqlx::query(
            r"
            INSERT INTO users (id, username, email, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(user.email.as_str())
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> EmporiumResult<User> {
        debug!("Updating user: {}", user.id);

        let result = sqlx::query(
            r"
            UPDATE users
            SET username = ?, email = ?, role = ?, updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(&user.username)
        .bind(user.email.as_str())
        .bind(user.role.as_str())
        .bind(user.updated_at)
        .bind(user.id.to_string())
        .execute(self.pool.inner())
        .await?;

        if result.rows_affected() == 0 {
            return Err(EmporiumError::not_found("User", user.id));
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> EmporiumResult<bool> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> EmporiumResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool.inner())
            .await?;

        Ok(u64::try_from(total).unwrap_or(0))
    }
}
