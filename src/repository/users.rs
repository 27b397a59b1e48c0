// src/repository/users.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::user::{Role, User},
};

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a user. `password_hash` must already be hashed.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password: password_hash.to_string(),
            role: role.as_str().to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.role)
        .bind(user.created_at)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Username '{}' already exists", username))
            }
            other => {
                tracing::error!("Failed to create user: {:?}", other);
                AppError::InternalServerError(other.to_string())
            }
        })?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, role, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, role, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password, role, created_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }

    /// Returns false when no user had that id.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of results recorded for the user and number of exams they own.
    pub async fn activity_counts(&self, id: &str) -> Result<(i64, i64), AppError> {
        let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM results WHERE user_id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        let authored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exams WHERE owner_id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok((taken, authored))
    }
}
