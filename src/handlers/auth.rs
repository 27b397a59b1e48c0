// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, LoginResponse, MeResponse, Role},
    repository::UserRepository,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
    },
};

/// Registers a new user.
///
/// Role defaults to examinee; admin accounts cannot self-register.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let role = payload.role.unwrap_or(Role::Examinee);
    if !role.can_self_register() {
        return Err(AppError::Forbidden(format!(
            "Role '{}' cannot be self-assigned",
            role.as_str()
        )));
    }

    let hashed_password = hash_password(&payload.password)?;
    let user = UserRepository::new(&pool)
        .create(&payload.username, &hashed_password, role)
        .await?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "User registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = UserRepository::new(&pool)
        .find_by_username(&payload.username)
        .await?
        .ok_or(AppError::AuthError("Invalid username or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError(
            "Invalid username or password".to_string(),
        ));
    }

    let role = user.role()?;
    let token = sign_jwt(
        &user.id,
        &user.username,
        role,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
        role,
    }))
}

/// Returns the current user's profile with activity counts.
pub async fn me(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let users = UserRepository::new(&pool);
    let user = users
        .find_by_id(&claims.sub)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;
    let (exams_taken, exams_authored) = users.activity_counts(&user.id).await?;

    Ok(Json(MeResponse {
        role: user.role()?,
        id: user.id,
        username: user.username,
        created_at: user.created_at,
        exams_taken,
        exams_authored,
    }))
}
