// src/models/question.rs

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::{error::AppError, models::parse_db_enum, utils::html::clean_html};

/// Closed set of supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiSelect,
    TrueFalse,
    TrueFalseJustification,
    ShortAnswer,
    Essay,
    Ordering,
    Matching,
}

impl QuestionType {
    pub const ALL: [QuestionType; 8] = [
        QuestionType::SingleChoice,
        QuestionType::MultiSelect,
        QuestionType::TrueFalse,
        QuestionType::TrueFalseJustification,
        QuestionType::ShortAnswer,
        QuestionType::Essay,
        QuestionType::Ordering,
        QuestionType::Matching,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultiSelect => "multi_select",
            QuestionType::TrueFalse => "true_false",
            QuestionType::TrueFalseJustification => "true_false_justification",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::Essay => "essay",
            QuestionType::Ordering => "ordering",
            QuestionType::Matching => "matching",
        }
    }

    /// The answer shape this question type prescribes.
    pub fn answer_shape(&self) -> AnswerShape {
        match self {
            QuestionType::SingleChoice
            | QuestionType::TrueFalse
            | QuestionType::ShortAnswer
            | QuestionType::Essay => AnswerShape::Text,
            QuestionType::MultiSelect | QuestionType::Ordering => AnswerShape::List,
            QuestionType::Matching => AnswerShape::Map,
            QuestionType::TrueFalseJustification => AnswerShape::Justified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerShape {
    Text,
    List,
    Map,
    Justified,
}

impl AnswerShape {
    pub fn describe(&self) -> &'static str {
        match self {
            AnswerShape::Text => "a string",
            AnswerShape::List => "an array of strings",
            AnswerShape::Map => "an object mapping strings to strings",
            AnswerShape::Justified => "an object with 'selection' and 'justification'",
        }
    }
}

/// A submitted or correct answer.
///
/// Untagged on the wire: a JSON string, an array of strings, an object with
/// `selection` + `justification`, or any other object of string values (matching).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "AnswerRepr")]
pub enum Answer {
    Text(String),
    List(Vec<String>),
    Justified {
        selection: String,
        justification: String,
    },
    Map(BTreeMap<String, String>),
}

/// Wire form of [`Answer`]. Objects with any key besides `selection` and
/// `justification` are matching answers and keep every pair.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerRepr {
    Text(String),
    List(Vec<String>),
    Justified(JustifiedRepr),
    Map(BTreeMap<String, String>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JustifiedRepr {
    selection: String,
    justification: String,
}

impl From<AnswerRepr> for Answer {
    fn from(repr: AnswerRepr) -> Self {
        match repr {
            AnswerRepr::Text(text) => Answer::Text(text),
            AnswerRepr::List(items) => Answer::List(items),
            AnswerRepr::Justified(JustifiedRepr {
                selection,
                justification,
            }) => Answer::Justified {
                selection,
                justification,
            },
            AnswerRepr::Map(pairs) => Answer::Map(pairs),
        }
    }
}

impl Answer {
    pub fn shape(&self) -> AnswerShape {
        match self {
            Answer::Text(_) => AnswerShape::Text,
            Answer::List(_) => AnswerShape::List,
            Answer::Map(_) => AnswerShape::Map,
            Answer::Justified { .. } => AnswerShape::Justified,
        }
    }

    /// Reads an ambiguous object as the shape `question_type` expects.
    ///
    /// A matching answer whose only keys are `selection` and `justification`
    /// arrives as `Justified`; for matching questions it becomes a `Map` again.
    pub fn fit_to(self, question_type: QuestionType) -> Answer {
        match (question_type.answer_shape(), self) {
            (
                AnswerShape::Map,
                Answer::Justified {
                    selection,
                    justification,
                },
            ) => Answer::Map(BTreeMap::from([
                ("justification".to_string(), justification),
                ("selection".to_string(), selection),
            ])),
            (_, answer) => answer,
        }
    }

    pub fn conforms_to(&self, question_type: QuestionType) -> bool {
        self.shape() == question_type.answer_shape()
    }
}

/// Review lifecycle of a bank question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl QuestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Draft => "draft",
            QuestionStatus::Pending => "pending",
            QuestionStatus::Approved => "approved",
            QuestionStatus::Rejected => "rejected",
        }
    }

    /// draft -> pending -> approved | rejected, rejected -> draft.
    pub fn can_transition_to(&self, next: QuestionStatus) -> bool {
        matches!(
            (self, next),
            (QuestionStatus::Draft, QuestionStatus::Pending)
                | (QuestionStatus::Pending, QuestionStatus::Approved)
                | (QuestionStatus::Pending, QuestionStatus::Rejected)
                | (QuestionStatus::Rejected, QuestionStatus::Draft)
        )
    }
}

/// Shared between questions and exams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    /// The user (or bank) that authored the question.
    pub owner_id: String,

    pub text: String,

    #[serde(rename = "type")]
    pub question_type: QuestionType,

    /// Choices shown to the examinee. For ordering questions these are the items
    /// to arrange; for matching questions, the right-hand candidates.
    #[serde(default)]
    pub options: Vec<String>,

    pub category: String,

    #[serde(default)]
    pub sub_category: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub points: u32,

    /// Shape always matches `question_type`.
    pub correct_answer: Answer,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<QuestionStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    pub created_at: DateTime<Utc>,
}

impl Question {
    /// Whether the question may be pulled from the bank into an exam.
    pub fn is_usable_in_exam(&self) -> bool {
        matches!(self.status, None | Some(QuestionStatus::Approved))
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, FromRow)]
pub struct QuestionRow {
    pub id: String,
    pub owner_id: String,
    pub text: String,
    pub question_type: String,
    pub options: Json<Vec<String>>,
    pub category: String,
    pub sub_category: Option<String>,
    pub tags: Json<Vec<String>>,
    pub points: i64,
    pub correct_answer: Json<Answer>,
    pub status: Option<String>,
    pub difficulty: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let question_type: QuestionType = parse_db_enum("question_type", &row.question_type)?;
        Ok(Question {
            id: row.id,
            owner_id: row.owner_id,
            text: row.text,
            question_type,
            options: row.options.0,
            category: row.category,
            sub_category: row.sub_category,
            tags: row.tags.0,
            points: u32::try_from(row.points)
                .map_err(|e| AppError::InternalServerError(e.to_string()))?,
            correct_answer: row.correct_answer.0.fit_to(question_type),
            status: row
                .status
                .as_deref()
                .map(|s| parse_db_enum("status", s))
                .transpose()?,
            difficulty: row
                .difficulty
                .as_deref()
                .map(|s| parse_db_enum("difficulty", s))
                .transpose()?,
            created_at: row.created_at,
        })
    }
}

/// DTO for sending a question to an examinee (excludes the correct answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub options: Vec<String>,
    /// Left-hand items of a matching question.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_keys: Vec<String>,
    pub points: u32,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        let match_keys = match &q.correct_answer {
            Answer::Map(pairs) => pairs.keys().cloned().collect(),
            _ => Vec::new(),
        };
        PublicQuestion {
            id: q.id.clone(),
            question_type: q.question_type,
            text: q.text.clone(),
            options: q.options.clone(),
            match_keys,
            points: q.points,
        }
    }
}

/// DTO for authoring a question, either into the bank or embedded in an exam.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionInput {
    /// Keeps a question's identity across exam edits.
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub sub_category: Option<String>,
    #[serde(default)]
    #[validate(custom(function = validate_tags))]
    pub tags: Vec<String>,
    #[validate(range(min = 1, max = 1000))]
    pub points: u32,
    pub correct_answer: Answer,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() > 20 {
        return Err(validator::ValidationError::new("too_many_options"));
    }
    for opt in options {
        if opt.is_empty() || opt.chars().count() > 500 {
            return Err(validator::ValidationError::new("option_length"));
        }
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), validator::ValidationError> {
    if tags.len() > 20 {
        return Err(validator::ValidationError::new("too_many_tags"));
    }
    if tags
        .iter()
        .any(|t| t.trim().is_empty() || t.chars().count() > 50)
    {
        return Err(validator::ValidationError::new("tag_length"));
    }
    Ok(())
}

impl QuestionInput {
    /// Field validation plus the type/answer consistency rules.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;

        let correct_answer = self.correct_answer.clone().fit_to(self.question_type);
        if !correct_answer.conforms_to(self.question_type) {
            return Err(AppError::Validation(format!(
                "correct_answer for a {} question must be {}",
                self.question_type.as_str(),
                self.question_type.answer_shape().describe()
            )));
        }

        // Choice-style answers must come from the offered options when options are given.
        if !self.options.is_empty() {
            let offered: HashSet<&str> = self.options.iter().map(String::as_str).collect();
            let in_options = match (&self.question_type, &correct_answer) {
                (QuestionType::SingleChoice, Answer::Text(a)) => offered.contains(a.as_str()),
                (QuestionType::MultiSelect | QuestionType::Ordering, Answer::List(items)) => {
                    items.iter().all(|a| offered.contains(a.as_str()))
                }
                (QuestionType::Matching, Answer::Map(pairs)) => {
                    pairs.values().all(|a| offered.contains(a.as_str()))
                }
                _ => true,
            };
            if !in_options {
                return Err(AppError::Validation(
                    "correct_answer references a value that is not among the options".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Builds the stored question. Text fields are sanitized.
    pub fn into_question(self, owner_id: &str, status: Option<QuestionStatus>) -> Question {
        Question {
            id: self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            owner_id: owner_id.to_string(),
            text: clean_html(&self.text),
            question_type: self.question_type,
            options: self.options,
            category: clean_html(&self.category),
            sub_category: self.sub_category.map(|s| clean_html(&s)),
            tags: self.tags.into_iter().map(|t| t.trim().to_lowercase()).collect(),
            points: self.points,
            correct_answer: self.correct_answer.fit_to(self.question_type),
            status,
            difficulty: self.difficulty,
            created_at: Utc::now(),
        }
    }
}

/// Query filters for listing the bank.
#[derive(Debug, Default, Deserialize)]
pub struct QuestionFilter {
    pub owner_id: Option<String>,
    pub status: Option<QuestionStatus>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: QuestionStatus,
}

/// DTO for the question generator endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuestionsRequest {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    #[validate(range(min = 1, max = 50))]
    pub count: u32,
}
