// src/repository/candidates.rs

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::candidate::{Candidate, CandidateRow, Stage},
};

const SELECT_CANDIDATES: &str = r#"
    SELECT id, owner_id, name, email, position, stage, notes, created_at, updated_at
    FROM candidates
"#;

pub struct CandidateRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CandidateRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, candidate: &Candidate) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO candidates (id, owner_id, name, email, position, stage, notes,
                                    created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&candidate.id)
        .bind(&candidate.owner_id)
        .bind(&candidate.name)
        .bind(&candidate.email)
        .bind(&candidate.position)
        .bind(candidate.stage.as_str())
        .bind(&candidate.notes)
        .bind(candidate.created_at)
        .bind(candidate.updated_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<Candidate>, AppError> {
        let row =
            sqlx::query_as::<_, CandidateRow>(&format!("{SELECT_CANDIDATES} WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        row.map(Candidate::try_from).transpose()
    }

    /// Oldest first, so a column reads in arrival order.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Candidate>, AppError> {
        let rows = sqlx::query_as::<_, CandidateRow>(&format!(
            "{SELECT_CANDIDATES} WHERE owner_id = ? ORDER BY created_at ASC"
        ))
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(Candidate::try_from).collect()
    }

    pub async fn update_stage(
        &self,
        id: &str,
        stage: Stage,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE candidates SET stage = ?, updated_at = ? WHERE id = ?")
            .bind(stage.as_str())
            .bind(updated_at)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Candidate not found".to_string()));
        }
        Ok(())
    }

    /// Interviews of the candidate go with it (ON DELETE CASCADE).
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM candidates WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
