// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{error::AppError, models::parse_db_enum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Teacher,
    Corporate,
    TrainingCompany,
    Admin,
    Examinee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Corporate => "corporate",
            Role::TrainingCompany => "training_company",
            Role::Admin => "admin",
            Role::Examinee => "examinee",
        }
    }

    /// Roles allowed to author questions, exams and manage candidates.
    pub fn is_author(&self) -> bool {
        !matches!(self, Role::Examinee)
    }

    /// Admin accounts are only created by another admin or the startup seed.
    pub fn can_self_register(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_db_enum("role", s)
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    /// Unique username; also the display name copied onto results.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub role: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Result<Role, AppError> {
        self.role.parse()
    }
}

/// Profile data for the current user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub exams_taken: i64,
    pub exams_authored: i64,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    /// Defaults to examinee.
    #[serde(default)]
    pub role: Option<Role>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub role: Role,
}
