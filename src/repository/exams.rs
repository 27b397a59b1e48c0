// src/repository/exams.rs

use sqlx::{SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::exam::{Exam, ExamRow},
};

const SELECT_EXAMS: &str = r#"
    SELECT id, owner_id, title, description, duration, difficulty, questions,
           question_count, created_at, updated_at
    FROM exams
"#;

pub struct ExamRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ExamRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, exam: &Exam) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO exams (id, owner_id, title, description, duration, difficulty,
                               questions, question_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&exam.id)
        .bind(&exam.owner_id)
        .bind(&exam.title)
        .bind(&exam.description)
        .bind(i64::from(exam.duration))
        .bind(exam.difficulty.as_str())
        .bind(Json(&exam.questions))
        // Derived from the embedded sequence, never from the caller.
        .bind(exam.questions.len() as i64)
        .bind(exam.created_at)
        .bind(exam.updated_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<Exam>, AppError> {
        let row = sqlx::query_as::<_, ExamRow>(&format!("{SELECT_EXAMS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(Exam::try_from).transpose()
    }

    /// All exams, or only those owned by `owner_id`. Newest first.
    pub async fn list(&self, owner_id: Option<&str>) -> Result<Vec<Exam>, AppError> {
        let rows = match owner_id {
            Some(owner_id) => {
                sqlx::query_as::<_, ExamRow>(&format!(
                    "{SELECT_EXAMS} WHERE owner_id = ? ORDER BY created_at DESC"
                ))
                .bind(owner_id)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ExamRow>(&format!("{SELECT_EXAMS} ORDER BY created_at DESC"))
                    .fetch_all(self.pool)
                    .await?
            }
        };
        rows.into_iter().map(Exam::try_from).collect()
    }

    pub async fn update(&self, exam: &Exam) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE exams
            SET title = ?, description = ?, duration = ?, difficulty = ?, questions = ?,
                question_count = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&exam.title)
        .bind(&exam.description)
        .bind(i64::from(exam.duration))
        .bind(exam.difficulty.as_str())
        .bind(Json(&exam.questions))
        .bind(exam.questions.len() as i64)
        .bind(exam.updated_at)
        .bind(&exam.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Exam not found".to_string()));
        }
        Ok(())
    }

    /// Results that reference the exam are kept; they keep their denormalized title.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM exams WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
