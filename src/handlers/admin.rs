// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::Role,
    repository::UserRepository,
    utils::{hash::hash_password, jwt::Claims},
};

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let users = UserRepository::new(&pool).list().await?;
    Ok(Json(users))
}

/// DTO for Admin creating a user (any role, including admin).
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username length must be between 3 and 50 characters."))]
    pub username: String,
    #[validate(length(min = 4, max = 128, message = "Password length must be between 4 and 128 characters."))]
    pub password: String,
    pub role: Role,
}

/// Creates a new user with a specific role.
/// Admin only.
pub async fn create_user(
    State(pool): State<SqlitePool>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;
    let user = UserRepository::new(&pool)
        .create(&payload.username, &hashed_password, payload.role)
        .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": user.id}))))
}

/// Deletes a user by ID.
/// Admin only. Prevents deleting self. Historical results are kept.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if id == claims.sub {
        return Err(AppError::Validation("Cannot delete yourself".to_string()));
    }

    if !UserRepository::new(&pool).delete(&id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, "User deleted by admin {}", claims.sub);
    Ok(StatusCode::NO_CONTENT)
}
