// src/handlers/exams.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::LEADERBOARD_SIZE,
    error::AppError,
    models::{
        exam::{
            AddBankQuestionsRequest, CreateExamRequest, Exam, ExamSummary, GenerateExamRequest,
            PublicExam, UpdateExamRequest,
        },
        exam_result::SubmitExamRequest,
    },
    repository::{ExamRepository, QuestionRepository, ResultRepository},
    services::{ExamService, GenerationRequest, QuestionGenerator, analytics::exam_analytics},
    utils::{html::clean_html, jwt::Claims},
};

#[derive(Debug, Deserialize)]
pub struct ExamListQuery {
    pub owner_id: Option<String>,
}

/// Owners and admins see correct answers; everyone else gets the examinee view.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ExamView {
    Full(Exam),
    Public(PublicExam),
}

async fn load_exam(pool: &SqlitePool, id: &str) -> Result<Exam, AppError> {
    ExamRepository::new(pool)
        .find(id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))
}

async fn load_managed_exam(pool: &SqlitePool, id: &str, claims: &Claims) -> Result<Exam, AppError> {
    let exam = load_exam(pool, id).await?;
    if !claims.can_manage(&exam.owner_id) {
        return Err(AppError::Forbidden(
            "Only the exam owner can do this".to_string(),
        ));
    }
    Ok(exam)
}

/// Lists exam summaries, optionally for a single owner.
pub async fn list_exams(
    State(pool): State<SqlitePool>,
    Query(query): Query<ExamListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let exams = ExamRepository::new(&pool)
        .list(query.owner_id.as_deref())
        .await?;
    let summaries: Vec<ExamSummary> = exams.iter().map(ExamSummary::from).collect();
    Ok(Json(summaries))
}

pub async fn get_exam(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exam = load_exam(&pool, &id).await?;
    let view = if claims.can_manage(&exam.owner_id) {
        ExamView::Full(exam)
    } else {
        ExamView::Public(PublicExam::from(&exam))
    };
    Ok(Json(view))
}

/// Creates an exam with its embedded questions. `question_count` is derived.
pub async fn create_exam(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exam = payload.into_exam(&claims.sub)?;
    ExamRepository::new(&pool).insert(&exam).await?;

    tracing::info!(exam_id = %exam.id, questions = exam.question_count, "Exam created");
    Ok((StatusCode::CREATED, Json(exam)))
}

pub async fn update_exam(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut exam = load_managed_exam(&pool, &id, &claims).await?;
    payload.apply(&mut exam)?;
    ExamRepository::new(&pool).update(&exam).await?;
    Ok(Json(exam))
}

/// Deletes an exam. Stored results remain, but can no longer be reviewed.
pub async fn delete_exam(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_managed_exam(&pool, &id, &claims).await?;
    ExamRepository::new(&pool).delete(&id).await?;
    tracing::info!(exam_id = %id, "Exam deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Appends copies of approved bank questions to the exam, in the requested order.
pub async fn add_bank_questions(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<AddBankQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.question_ids.is_empty() {
        return Err(AppError::Validation("No question ids given".to_string()));
    }

    let mut exam = load_managed_exam(&pool, &id, &claims).await?;
    let found = QuestionRepository::new(&pool)
        .find_many(&payload.question_ids)
        .await?;

    if let Some(missing) = payload
        .question_ids
        .iter()
        .find(|qid| !found.iter().any(|q| &q.id == *qid))
    {
        return Err(AppError::NotFound(format!("Question '{missing}' not found")));
    }

    for mut question in found {
        if !question.is_usable_in_exam() {
            return Err(AppError::Validation(format!(
                "Question '{}' is not approved",
                question.id
            )));
        }
        if exam.question(&question.id).is_some() {
            return Err(AppError::Conflict(format!(
                "Question '{}' is already in this exam",
                question.id
            )));
        }
        question.status = None;
        exam.questions.push(question);
    }

    exam.refresh();
    ExamRepository::new(&pool).update(&exam).await?;
    Ok(Json(exam))
}

/// Builds a new exam from generated questions.
pub async fn generate_exam(
    State(pool): State<SqlitePool>,
    State(generator): State<Arc<dyn QuestionGenerator>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GenerateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut questions = generator
        .generate_questions(&GenerationRequest {
            topic: payload.topic.clone(),
            question_type: payload.question_type,
            difficulty: payload.difficulty,
            count: payload.count,
            owner_id: claims.sub.clone(),
        })
        .await?;
    // Embedded copies have no review lifecycle.
    for question in &mut questions {
        question.status = None;
    }

    let now = Utc::now();
    let mut exam = Exam {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: claims.sub.clone(),
        title: clean_html(&payload.title),
        description: Some(format!("Generated exam on {}", clean_html(&payload.topic))),
        duration: payload.duration,
        difficulty: payload.difficulty,
        questions,
        question_count: 0,
        created_at: now,
        updated_at: now,
    };
    exam.refresh();
    ExamRepository::new(&pool).insert(&exam).await?;

    tracing::info!(exam_id = %exam.id, questions = exam.question_count, "Generated exam created");
    Ok((StatusCode::CREATED, Json(exam)))
}

/// Scores and records an attempt for the calling user.
pub async fn submit_exam(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = ExamService::new(pool)
        .submit_exam(&id, &claims.sub, &claims.name, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Top scores for one exam.
pub async fn get_leaderboard(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_exam(&pool, &id).await?;
    let leaderboard = ResultRepository::new(&pool)
        .leaderboard(&id, LEADERBOARD_SIZE)
        .await?;
    Ok(Json(leaderboard))
}

/// Aggregated statistics over every attempt. Owner or admin.
pub async fn get_analytics(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exam = load_managed_exam(&pool, &id, &claims).await?;
    let results = ResultRepository::new(&pool).for_exam(&id).await?;
    Ok(Json(exam_analytics(&exam, &results)))
}
