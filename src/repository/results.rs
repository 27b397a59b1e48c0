// src/repository/results.rs

use sqlx::{SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::exam_result::{ExamResult, LeaderboardEntry, ResultRow, ResultWithExam},
    repository::ExamRepository,
};

const SELECT_RESULTS: &str = r#"
    SELECT id, exam_id, exam_title, user_id, user_name, submitted_at, score,
           total_points, answers, proctoring_events
    FROM results
"#;

/// Append-only store of exam results.
pub struct ResultRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ResultRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends a result. Every submission is a new record; there is no update path.
    pub async fn record(&self, result: &ExamResult) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO results (id, exam_id, exam_title, user_id, user_name, submitted_at,
                                 score, total_points, answers, proctoring_events)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.id)
        .bind(&result.exam_id)
        .bind(&result.exam_title)
        .bind(&result.user_id)
        .bind(&result.user_name)
        .bind(result.submitted_at)
        .bind(i64::from(result.score))
        .bind(i64::from(result.total_points))
        .bind(Json(&result.answers))
        .bind(Json(&result.proctoring_events))
        .execute(self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record result {}: {:?}", result.id, e);
            AppError::InternalServerError(e.to_string())
        })?;
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<ExamResult>, AppError> {
        let row = sqlx::query_as::<_, ResultRow>(&format!("{SELECT_RESULTS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(ExamResult::try_from).transpose()
    }

    /// All results of a user. No ordering is guaranteed.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<ExamResult>, AppError> {
        let rows = sqlx::query_as::<_, ResultRow>(&format!("{SELECT_RESULTS} WHERE user_id = ?"))
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(ExamResult::try_from).collect()
    }

    pub async fn for_exam(&self, exam_id: &str) -> Result<Vec<ExamResult>, AppError> {
        let rows = sqlx::query_as::<_, ResultRow>(&format!("{SELECT_RESULTS} WHERE exam_id = ?"))
            .bind(exam_id)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(ExamResult::try_from).collect()
    }

    /// The stored result joined with the live exam.
    /// NotFound if either the result or its exam no longer exists.
    pub async fn with_exam(&self, id: &str) -> Result<ResultWithExam, AppError> {
        let result = self
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Result not found".to_string()))?;

        let exam = ExamRepository::new(self.pool)
            .find(&result.exam_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exam for this result no longer exists".to_string()))?;

        Ok(ResultWithExam { result, exam })
    }

    /// Highest scores first; ties go to the earlier submission.
    pub async fn leaderboard(
        &self,
        exam_id: &str,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT user_name, score, total_points, submitted_at
            FROM results
            WHERE exam_id = ?
            ORDER BY score DESC, submitted_at ASC
            LIMIT ?
            "#,
        )
        .bind(exam_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch leaderboard: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;
        Ok(entries)
    }
}
