// src/repository/questions.rs

use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::question::{Question, QuestionFilter, QuestionRow, QuestionStatus},
};

const SELECT_QUESTIONS: &str = r#"
    SELECT id, owner_id, text, question_type, options, category, sub_category,
           tags, points, correct_answer, status, difficulty, created_at
    FROM questions
"#;

/// The shared question bank.
pub struct QuestionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> QuestionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, question: &Question) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO questions (id, owner_id, text, question_type, options, category,
                                   sub_category, tags, points, correct_answer, status,
                                   difficulty, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&question.id)
        .bind(&question.owner_id)
        .bind(&question.text)
        .bind(question.question_type.as_str())
        .bind(Json(&question.options))
        .bind(&question.category)
        .bind(&question.sub_category)
        .bind(Json(&question.tags))
        .bind(i64::from(question.points))
        .bind(Json(&question.correct_answer))
        .bind(question.status.map(|s| s.as_str()))
        .bind(question.difficulty.map(|d| d.as_str()))
        .bind(question.created_at)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Question '{}' already exists", question.id))
            }
            other => AppError::InternalServerError(other.to_string()),
        })?;
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<Question>, AppError> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!("{SELECT_QUESTIONS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(Question::try_from).transpose()
    }

    pub async fn list(&self, filter: &QuestionFilter) -> Result<Vec<Question>, AppError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(SELECT_QUESTIONS);
        query_builder.push(" WHERE 1 = 1");

        if let Some(owner_id) = &filter.owner_id {
            query_builder.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(status) = filter.status {
            query_builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(category) = &filter.category {
            query_builder.push(" AND category = ").push_bind(category);
        }
        if let Some(question_type) = filter.question_type {
            query_builder
                .push(" AND question_type = ")
                .push_bind(question_type.as_str());
        }
        query_builder.push(" ORDER BY created_at DESC");

        let rows: Vec<QuestionRow> = query_builder
            .build_query_as()
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(Question::try_from).collect()
    }

    /// Fetches the given ids, preserving the requested order. Missing ids are skipped.
    pub async fn find_many(&self, ids: &[String]) -> Result<Vec<Question>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new(SELECT_QUESTIONS);
        query_builder.push(" WHERE id IN (");
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows: Vec<QuestionRow> = query_builder
            .build_query_as()
            .fetch_all(self.pool)
            .await?;
        let mut found: Vec<Question> = rows
            .into_iter()
            .map(Question::try_from)
            .collect::<Result<_, _>>()?;
        found.sort_by_key(|q| ids.iter().position(|id| *id == q.id));
        Ok(found)
    }

    /// Overwrites the editable fields of an existing question.
    pub async fn update(&self, question: &Question) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE questions
            SET text = ?, question_type = ?, options = ?, category = ?, sub_category = ?,
                tags = ?, points = ?, correct_answer = ?, status = ?, difficulty = ?
            WHERE id = ?
            "#,
        )
        .bind(&question.text)
        .bind(question.question_type.as_str())
        .bind(Json(&question.options))
        .bind(&question.category)
        .bind(&question.sub_category)
        .bind(Json(&question.tags))
        .bind(i64::from(question.points))
        .bind(Json(&question.correct_answer))
        .bind(question.status.map(|s| s.as_str()))
        .bind(question.difficulty.map(|d| d.as_str()))
        .bind(&question.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Question not found".to_string()));
        }
        Ok(())
    }

    pub async fn set_status(&self, id: &str, status: QuestionStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE questions SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Question not found".to_string()));
        }
        Ok(())
    }

    /// Removing a bank question never touches exams that embedded a copy of it.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
