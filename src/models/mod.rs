// src/models/mod.rs

pub mod candidate;
pub mod exam;
pub mod exam_result;
pub mod interview;
pub mod question;
pub mod user;

use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Parses a TEXT column holding a serde-renamed unit enum (e.g. `"single_choice"`).
pub(crate) fn parse_db_enum<T: DeserializeOwned>(column: &str, value: &str) -> Result<T, AppError> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(|_| {
        AppError::InternalServerError(format!("Unexpected value '{value}' in column '{column}'"))
    })
}
