// src/models/candidate.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{error::AppError, models::parse_db_enum};

/// Kanban columns, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Applied,
    Screening,
    Assessment,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl Stage {
    pub const PIPELINE: [Stage; 7] = [
        Stage::Applied,
        Stage::Screening,
        Stage::Assessment,
        Stage::Interview,
        Stage::Offer,
        Stage::Hired,
        Stage::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Applied => "applied",
            Stage::Screening => "screening",
            Stage::Assessment => "assessment",
            Stage::Interview => "interview",
            Stage::Offer => "offer",
            Stage::Hired => "hired",
            Stage::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub position: String,
    pub stage: Stage,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents the 'candidates' table in the database.
#[derive(Debug, FromRow)]
pub struct CandidateRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub position: String,
    pub stage: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = AppError;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        Ok(Candidate {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            email: row.email,
            position: row.position,
            stage: parse_db_enum("stage", &row.stage)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCandidateRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub position: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveCandidateRequest {
    pub stage: Stage,
}

/// One kanban column.
#[derive(Debug, Serialize)]
pub struct PipelineColumn {
    pub stage: Stage,
    pub candidates: Vec<Candidate>,
}

/// Groups candidates into columns in pipeline order. Every stage gets a column.
pub fn build_board(candidates: Vec<Candidate>) -> Vec<PipelineColumn> {
    let mut board: Vec<PipelineColumn> = Stage::PIPELINE
        .iter()
        .map(|stage| PipelineColumn {
            stage: *stage,
            candidates: Vec::new(),
        })
        .collect();
    for candidate in candidates {
        if let Some(column) = board.iter_mut().find(|c| c.stage == candidate.stage) {
            column.candidates.push(candidate);
        }
    }
    board
}
