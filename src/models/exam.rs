// src/models/exam.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        parse_db_enum,
        question::{Difficulty, PublicQuestion, Question, QuestionInput, QuestionType},
    },
    utils::html::clean_html,
};

/// An exam owns an ordered sequence of questions; insertion order is presentation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Minutes.
    pub duration: u32,
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
    /// Always equal to `questions.len()`.
    pub question_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exam {
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    /// Recomputes derived fields. Called before every save.
    pub fn refresh(&mut self) {
        self.question_count = self.questions.len();
        self.updated_at = Utc::now();
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Represents the 'exams' table in the database.
#[derive(Debug, FromRow)]
pub struct ExamRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration: i64,
    pub difficulty: String,
    pub questions: Json<Vec<Question>>,
    pub question_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ExamRow> for Exam {
    type Error = AppError;

    fn try_from(row: ExamRow) -> Result<Self, Self::Error> {
        let questions: Vec<Question> = row
            .questions
            .0
            .into_iter()
            .map(|mut q| {
                q.correct_answer = q.correct_answer.fit_to(q.question_type);
                q
            })
            .collect();
        Ok(Exam {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            duration: u32::try_from(row.duration)
                .map_err(|e| AppError::InternalServerError(e.to_string()))?,
            difficulty: parse_db_enum("difficulty", &row.difficulty)?,
            // The stored count is never trusted.
            question_count: questions.len(),
            questions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Listing entry, without questions.
#[derive(Debug, Serialize)]
pub struct ExamSummary {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration: u32,
    pub difficulty: Difficulty,
    pub question_count: usize,
    pub total_points: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&Exam> for ExamSummary {
    fn from(exam: &Exam) -> Self {
        ExamSummary {
            id: exam.id.clone(),
            owner_id: exam.owner_id.clone(),
            title: exam.title.clone(),
            description: exam.description.clone(),
            duration: exam.duration,
            difficulty: exam.difficulty,
            question_count: exam.question_count,
            total_points: exam.total_points(),
            created_at: exam.created_at,
        }
    }
}

/// DTO for an examinee taking the exam (no correct answers).
#[derive(Debug, Serialize)]
pub struct PublicExam {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration: u32,
    pub difficulty: Difficulty,
    pub question_count: usize,
    pub total_points: u32,
    pub questions: Vec<PublicQuestion>,
}

impl From<&Exam> for PublicExam {
    fn from(exam: &Exam) -> Self {
        PublicExam {
            id: exam.id.clone(),
            title: exam.title.clone(),
            description: exam.description.clone(),
            duration: exam.duration,
            difficulty: exam.difficulty,
            question_count: exam.question_count,
            total_points: exam.total_points(),
            questions: exam.questions.iter().map(PublicQuestion::from).collect(),
        }
    }
}

/// DTO for creating an exam with its embedded questions.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 600))]
    pub duration: u32,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
    /// Caller-supplied count is accepted for compatibility and ignored.
    #[serde(default)]
    pub question_count: Option<usize>,
}

/// DTO for updating an exam. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExamRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 600))]
    pub duration: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub questions: Option<Vec<QuestionInput>>,
    #[serde(default)]
    pub question_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AddBankQuestionsRequest {
    pub question_ids: Vec<String>,
}

/// DTO for building an exam out of generated questions.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateExamRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    #[validate(range(min = 1, max = 50))]
    pub count: u32,
    #[validate(range(min = 1, max = 600))]
    pub duration: u32,
}

/// Checks and converts authored questions for embedding in an exam.
pub fn build_questions(inputs: Vec<QuestionInput>, owner_id: &str) -> Result<Vec<Question>, AppError> {
    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(inputs.len());
    for input in inputs {
        input.check()?;
        let question = input.into_question(owner_id, None);
        if !seen.insert(question.id.clone()) {
            return Err(AppError::Validation(format!(
                "Duplicate question id '{}' in exam",
                question.id
            )));
        }
        questions.push(question);
    }
    Ok(questions)
}

impl CreateExamRequest {
    pub fn into_exam(self, owner_id: &str) -> Result<Exam, AppError> {
        self.validate()?;
        let questions = build_questions(self.questions, owner_id)?;
        let now = Utc::now();
        let mut exam = Exam {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: clean_html(&self.title),
            description: self.description.map(|d| clean_html(&d)),
            duration: self.duration,
            difficulty: self.difficulty,
            questions,
            question_count: 0,
            created_at: now,
            updated_at: now,
        };
        exam.refresh();
        Ok(exam)
    }
}

impl UpdateExamRequest {
    pub fn apply(self, exam: &mut Exam) -> Result<(), AppError> {
        self.validate()?;
        if let Some(questions) = self.questions {
            exam.questions = build_questions(questions, &exam.owner_id)?;
        }
        if let Some(title) = self.title {
            exam.title = clean_html(&title);
        }
        if let Some(description) = self.description {
            exam.description = Some(clean_html(&description));
        }
        if let Some(duration) = self.duration {
            exam.duration = duration;
        }
        if let Some(difficulty) = self.difficulty {
            exam.difficulty = difficulty;
        }
        exam.refresh();
        Ok(())
    }
}
