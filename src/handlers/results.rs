// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{error::AppError, services::ExamService, utils::jwt::Claims};

/// The caller's own results, most recent first.
pub async fn my_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results = ExamService::new(pool).results_for_user(&claims.sub).await?;
    Ok(Json(results))
}

/// Results of any user. Authoring roles only.
pub async fn user_results(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let results = ExamService::new(pool).results_for_user(&user_id).await?;
    Ok(Json(results))
}

/// A result joined with its exam, for review and printing.
///
/// Visible to the examinee who submitted it, the exam owner and admins.
pub async fn get_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let review = ExamService::new(pool).result_with_exam(&id).await?;

    let allowed = review.result.user_id == claims.sub || claims.can_manage(&review.exam.owner_id);
    if !allowed {
        // Same answer as a missing result, so ids cannot be probed.
        return Err(AppError::NotFound("Result not found".to_string()));
    }

    Ok(Json(review))
}
