// src/handlers/questions.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{
        GenerateQuestionsRequest, QuestionFilter, QuestionInput, QuestionStatus, ReviewRequest,
    },
    repository::QuestionRepository,
    services::{GenerationRequest, QuestionGenerator},
    utils::jwt::Claims,
};

/// Lists bank questions, optionally filtered by owner, status, category or type.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
    Query(filter): Query<QuestionFilter>,
) -> Result<impl IntoResponse, AppError> {
    let questions = QuestionRepository::new(&pool).list(&filter).await?;
    Ok(Json(questions))
}

/// Adds a question to the bank as a draft.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<QuestionInput>,
) -> Result<impl IntoResponse, AppError> {
    payload.check()?;

    let question = payload.into_question(&claims.sub, Some(QuestionStatus::Draft));
    QuestionRepository::new(&pool).insert(&question).await?;

    tracing::info!(question_id = %question.id, owner_id = %claims.sub, "Question created");
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn get_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let question = QuestionRepository::new(&pool)
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;
    Ok(Json(question))
}

/// Replaces a question's content. Owner or admin.
/// Any edit sends the question back to draft so it is reviewed again.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<QuestionInput>,
) -> Result<impl IntoResponse, AppError> {
    payload.check()?;

    let repo = QuestionRepository::new(&pool);
    let existing = repo
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if !claims.can_manage(&existing.owner_id) {
        return Err(AppError::Forbidden(
            "Only the owner can edit this question".to_string(),
        ));
    }

    let mut updated = payload.into_question(&existing.owner_id, Some(QuestionStatus::Draft));
    updated.id = existing.id;
    updated.created_at = existing.created_at;
    repo.update(&updated).await?;

    Ok(Json(updated))
}

/// Deletes a bank question. Exams holding a copy are unaffected.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let repo = QuestionRepository::new(&pool);
    let existing = repo
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if !claims.can_manage(&existing.owner_id) {
        return Err(AppError::Forbidden(
            "Only the owner can delete this question".to_string(),
        ));
    }

    repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Moves a question through review.
///
/// * draft -> pending and rejected -> draft: owner (or admin).
/// * pending -> approved | rejected: admin only.
pub async fn review_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let repo = QuestionRepository::new(&pool);
    let question = repo
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let current = question.status.unwrap_or(QuestionStatus::Draft);
    let next = payload.status;

    if !current.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "Cannot move a {} question to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    let is_verdict = matches!(next, QuestionStatus::Approved | QuestionStatus::Rejected);
    let allowed = if is_verdict {
        claims.is_admin()
    } else {
        claims.can_manage(&question.owner_id)
    };
    if !allowed {
        return Err(AppError::Forbidden(
            "Not allowed to perform this review step".to_string(),
        ));
    }

    repo.set_status(&id, next).await?;
    tracing::info!(
        question_id = %id,
        from = current.as_str(),
        to = next.as_str(),
        "Question review status changed"
    );

    Ok(Json(serde_json::json!({ "id": id, "status": next })))
}

/// Generates questions with the injected generator and stores them as pending.
pub async fn generate_questions(
    State(pool): State<SqlitePool>,
    State(generator): State<Arc<dyn QuestionGenerator>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GenerateQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let questions = generator
        .generate_questions(&GenerationRequest {
            topic: payload.topic,
            question_type: payload.question_type,
            difficulty: payload.difficulty,
            count: payload.count,
            owner_id: claims.sub.clone(),
        })
        .await?;

    let repo = QuestionRepository::new(&pool);
    for question in &questions {
        repo.insert(question).await?;
    }

    tracing::info!(count = questions.len(), owner_id = %claims.sub, "Generated questions stored");
    Ok((StatusCode::CREATED, Json(questions)))
}
