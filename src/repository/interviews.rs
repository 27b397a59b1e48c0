// src/repository/interviews.rs

use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::interview::{Interview, InterviewRow, InterviewStatus},
};

const SELECT_INTERVIEWS: &str = r#"
    SELECT id, candidate_id, interviewer_id, scheduled_at, duration_minutes,
           meeting_url, status, created_at
    FROM interviews
"#;

pub struct InterviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InterviewRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts the interview unless it overlaps another scheduled interview of
    /// the same interviewer. Check and insert are one statement, so concurrent
    /// callers cannot both claim a slot. Returns whether the row was written.
    pub async fn insert_if_free(&self, interview: &Interview) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO interviews (id, candidate_id, interviewer_id, scheduled_at,
                                    duration_minutes, meeting_url, status, created_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM interviews
                WHERE interviewer_id = ?
                  AND status = ?
                  AND CAST(strftime('%s', scheduled_at) AS INTEGER) < ?
                  AND ? < CAST(strftime('%s', scheduled_at) AS INTEGER) + duration_minutes * 60
            )
            "#,
        )
        .bind(&interview.id)
        .bind(&interview.candidate_id)
        .bind(&interview.interviewer_id)
        .bind(interview.scheduled_at)
        .bind(i64::from(interview.duration_minutes))
        .bind(&interview.meeting_url)
        .bind(interview.status.as_str())
        .bind(interview.created_at)
        .bind(&interview.interviewer_id)
        .bind(InterviewStatus::Scheduled.as_str())
        .bind(interview.ends_at().timestamp())
        .bind(interview.scheduled_at.timestamp())
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn find(&self, id: &str) -> Result<Option<Interview>, AppError> {
        let row =
            sqlx::query_as::<_, InterviewRow>(&format!("{SELECT_INTERVIEWS} WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        row.map(Interview::try_from).transpose()
    }

    pub async fn for_candidate(&self, candidate_id: &str) -> Result<Vec<Interview>, AppError> {
        let rows = sqlx::query_as::<_, InterviewRow>(&format!(
            "{SELECT_INTERVIEWS} WHERE candidate_id = ? ORDER BY scheduled_at ASC"
        ))
        .bind(candidate_id)
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(Interview::try_from).collect()
    }

    /// Scheduled (not cancelled) interviews of one interviewer.
    pub async fn scheduled_for_interviewer(
        &self,
        interviewer_id: &str,
    ) -> Result<Vec<Interview>, AppError> {
        let rows = sqlx::query_as::<_, InterviewRow>(&format!(
            "{SELECT_INTERVIEWS} WHERE interviewer_id = ? AND status = ?"
        ))
        .bind(interviewer_id)
        .bind(InterviewStatus::Scheduled.as_str())
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(Interview::try_from).collect()
    }

    pub async fn set_status(&self, id: &str, status: InterviewStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE interviews SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Interview not found".to_string()));
        }
        Ok(())
    }
}
