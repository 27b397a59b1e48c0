// src/services/exam_service.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::exam_result::{ExamResult, ResultWithExam, SubmitExamRequest},
    repository::{ExamRepository, ResultRepository},
    services::grading::{check_answer_shapes, fit_answers, grade},
};

/// Submission and review boundary used by the HTTP layer.
#[derive(Clone)]
pub struct ExamService {
    pool: SqlitePool,
}

impl ExamService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Scores a submission and records the result.
    ///
    /// * Fails with `NotFound` if the exam does not exist.
    /// * Fails with `Validation` if an answer's shape contradicts its question's type.
    ///
    /// Nothing is stored on failure.
    pub async fn submit_exam(
        &self,
        exam_id: &str,
        user_id: &str,
        user_name: &str,
        request: SubmitExamRequest,
    ) -> Result<ExamResult, AppError> {
        let exam = ExamRepository::new(&self.pool)
            .find(exam_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;

        let answers = fit_answers(&exam, request.answers);
        check_answer_shapes(&exam, &answers)?;
        let grade = grade(&exam, &answers);

        let result = ExamResult {
            id: uuid::Uuid::new_v4().to_string(),
            exam_id: exam.id.clone(),
            exam_title: exam.title.clone(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            submitted_at: Utc::now(),
            score: grade.score,
            total_points: grade.total_points,
            answers,
            proctoring_events: request.proctoring_events,
        };

        ResultRepository::new(&self.pool).record(&result).await?;

        tracing::info!(
            result_id = %result.id,
            exam_id = %result.exam_id,
            user_id = %result.user_id,
            score = result.score,
            total_points = result.total_points,
            "Exam submission recorded"
        );

        Ok(result)
    }

    /// All results of a user, most recent first.
    pub async fn results_for_user(&self, user_id: &str) -> Result<Vec<ExamResult>, AppError> {
        let mut results = ResultRepository::new(&self.pool).for_user(user_id).await?;
        results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(results)
    }

    pub async fn result_with_exam(&self, result_id: &str) -> Result<ResultWithExam, AppError> {
        ResultRepository::new(&self.pool).with_exam(result_id).await
    }
}
