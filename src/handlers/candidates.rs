// src/handlers/candidates.rs

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
    error::AppError,
    models::candidate::{
        Candidate, CreateCandidateRequest, MoveCandidateRequest, Stage, build_board,
    },
    repository::CandidateRepository,
    utils::{html::clean_html, jwt::Claims},
};

/// Loads a candidate the caller may manage. Others get 404.
pub(crate) async fn load_candidate(
    pool: &SqlitePool,
    id: &str,
    claims: &Claims,
) -> Result<Candidate, AppError> {
    CandidateRepository::new(pool)
        .find(id)
        .await?
        .filter(|c| claims.can_manage(&c.owner_id))
        .ok_or(AppError::NotFound("Candidate not found".to_string()))
}

/// The caller's pipeline as kanban columns.
pub async fn get_board(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let candidates = CandidateRepository::new(&pool)
        .list_for_owner(&claims.sub)
        .await?;
    Ok(Json(build_board(candidates)))
}

/// Adds a candidate to the first column.
pub async fn create_candidate(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCandidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let now = Utc::now();
    let candidate = Candidate {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: claims.sub.clone(),
        name: clean_html(&payload.name),
        email: payload.email,
        position: clean_html(&payload.position),
        stage: Stage::Applied,
        notes: payload.notes.map(|n| clean_html(&n)),
        created_at: now,
        updated_at: now,
    };
    CandidateRepository::new(&pool).insert(&candidate).await?;

    Ok((StatusCode::CREATED, Json(candidate)))
}

pub async fn get_candidate(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_candidate(&pool, &id, &claims).await?))
}

/// Moves a candidate to any column. Same-column moves change nothing.
pub async fn move_candidate(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<MoveCandidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut candidate = load_candidate(&pool, &id, &claims).await?;

    if candidate.stage != payload.stage {
        let now = Utc::now();
        CandidateRepository::new(&pool)
            .update_stage(&id, payload.stage, now)
            .await?;
        tracing::info!(
            candidate_id = %id,
            from = candidate.stage.as_str(),
            to = payload.stage.as_str(),
            "Candidate moved"
        );
        candidate.stage = payload.stage;
        candidate.updated_at = now;
    }

    Ok(Json(candidate))
}

pub async fn delete_candidate(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_candidate(&pool, &id, &claims).await?;
    CandidateRepository::new(&pool).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
