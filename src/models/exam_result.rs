// src/models/exam_result.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

use crate::{
    error::AppError,
    models::{exam::Exam, question::Answer},
};

/// Submitted answers keyed by question id.
pub type StudentAnswers = BTreeMap<String, Answer>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProctoringEventType {
    TabSwitch,
    WindowBlur,
    FullscreenExit,
    CopyPaste,
    FaceNotDetected,
    MultipleFaces,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// An integrity signal recorded during an attempt. Carried through to review, never scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProctoringEvent {
    #[serde(rename = "type")]
    pub event_type: ProctoringEventType,
    /// Milliseconds since the attempt started.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// The outcome of one submission. Created once and never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: String,
    pub exam_id: String,
    /// Copied at submission; does not follow later renames.
    pub exam_title: String,
    pub user_id: String,
    pub user_name: String,
    pub submitted_at: DateTime<Utc>,
    pub score: u32,
    pub total_points: u32,
    /// The submitted mapping, verbatim.
    pub answers: StudentAnswers,
    #[serde(default)]
    pub proctoring_events: Vec<ProctoringEvent>,
}

impl ExamResult {
    pub fn percentage(&self) -> f64 {
        if self.total_points == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.total_points) * 100.0
    }
}

/// Represents the 'results' table in the database.
#[derive(Debug, FromRow)]
pub struct ResultRow {
    pub id: String,
    pub exam_id: String,
    pub exam_title: String,
    pub user_id: String,
    pub user_name: String,
    pub submitted_at: DateTime<Utc>,
    pub score: i64,
    pub total_points: i64,
    pub answers: Json<StudentAnswers>,
    pub proctoring_events: Json<Vec<ProctoringEvent>>,
}

impl TryFrom<ResultRow> for ExamResult {
    type Error = AppError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        let to_u32 =
            |v: i64| u32::try_from(v).map_err(|e| AppError::InternalServerError(e.to_string()));
        Ok(ExamResult {
            id: row.id,
            exam_id: row.exam_id,
            exam_title: row.exam_title,
            user_id: row.user_id,
            user_name: row.user_name,
            submitted_at: row.submitted_at,
            score: to_u32(row.score)?,
            total_points: to_u32(row.total_points)?,
            answers: row.answers.0,
            proctoring_events: row.proctoring_events.0,
        })
    }
}

/// DTO for submitting an attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    /// Key: question id. Value: the examinee's answer.
    #[serde(default)]
    pub answers: StudentAnswers,
    #[serde(default)]
    pub proctoring_events: Vec<ProctoringEvent>,
}

/// A stored result joined with the current state of its exam, for review.
#[derive(Debug, Serialize)]
pub struct ResultWithExam {
    pub result: ExamResult,
    pub exam: Exam,
}

#[derive(Debug, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub user_name: String,
    pub score: i64,
    pub total_points: i64,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct QuestionAnalytics {
    pub question_id: String,
    pub text: String,
    pub correct_count: u32,
    /// Percentage of attempts that answered correctly.
    pub correct_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct ExamAnalytics {
    pub exam_id: String,
    pub exam_title: String,
    pub attempts: u32,
    pub average_percentage: f64,
    pub highest_percentage: f64,
    pub lowest_percentage: f64,
    /// Percentage of attempts at or above the passing score.
    pub pass_rate: f64,
    pub high_severity_events: u32,
    pub questions: Vec<QuestionAnalytics>,
}
