// src/handlers/interviews.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    handlers::candidates::load_candidate,
    models::interview::{Interview, InterviewStatus, ScheduleInterviewRequest},
    repository::{InterviewRepository, UserRepository},
    services::scheduling::{check_slot, meeting_url},
    utils::jwt::Claims,
};

/// Schedules an interview with a video room for one of the caller's candidates.
pub async fn schedule_interview(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(candidate_id): Path<String>,
    Json(payload): Json<ScheduleInterviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let candidate = load_candidate(&pool, &candidate_id, &claims).await?;

    let interviewer_id = payload.interviewer_id.unwrap_or_else(|| claims.sub.clone());
    if interviewer_id != claims.sub
        && UserRepository::new(&pool)
            .find_by_id(&interviewer_id)
            .await?
            .is_none()
    {
        return Err(AppError::NotFound("Interviewer not found".to_string()));
    }

    let repo = InterviewRepository::new(&pool);
    let agenda = repo.scheduled_for_interviewer(&interviewer_id).await?;
    check_slot(
        &agenda,
        payload.scheduled_at,
        payload.duration_minutes,
        Utc::now(),
    )?;

    let id = uuid::Uuid::new_v4().to_string();
    let interview = Interview {
        meeting_url: meeting_url(&config.meeting_base_url, &id)?,
        id,
        candidate_id: candidate.id,
        interviewer_id,
        scheduled_at: payload.scheduled_at,
        duration_minutes: payload.duration_minutes,
        status: InterviewStatus::Scheduled,
        created_at: Utc::now(),
    };
    // The agenda may have changed since it was read.
    if !repo.insert_if_free(&interview).await? {
        return Err(AppError::Conflict(
            "Interviewer already has an interview in this slot".to_string(),
        ));
    }

    tracing::info!(
        interview_id = %interview.id,
        candidate_id = %interview.candidate_id,
        "Interview scheduled"
    );
    Ok((StatusCode::CREATED, Json(interview)))
}

pub async fn list_interviews(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(candidate_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_candidate(&pool, &candidate_id, &claims).await?;
    let interviews = InterviewRepository::new(&pool)
        .for_candidate(&candidate_id)
        .await?;
    Ok(Json(interviews))
}

/// Cancels an interview. Cancelling twice is a conflict.
pub async fn cancel_interview(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let repo = InterviewRepository::new(&pool);
    let mut interview = repo
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("Interview not found".to_string()))?;
    load_candidate(&pool, &interview.candidate_id, &claims).await?;

    if interview.status == InterviewStatus::Cancelled {
        return Err(AppError::Conflict(
            "Interview is already cancelled".to_string(),
        ));
    }

    repo.set_status(&id, InterviewStatus::Cancelled).await?;
    interview.status = InterviewStatus::Cancelled;
    Ok(Json(interview))
}
