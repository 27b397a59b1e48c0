// src/services/grading.rs

use crate::{
    error::AppError,
    models::{
        exam::Exam,
        exam_result::StudentAnswers,
        question::{Answer, Question},
    },
};

/// Decides whether a submitted answer equals the designated correct answer.
///
/// Equality is exact and structural: lists compare by position, maps key by key
/// regardless of order, justification pairs compare both fields case-sensitively.
/// An absent answer is never correct. No trimming or case folding happens here.
pub fn answers_equal(submitted: Option<&Answer>, correct: &Answer) -> bool {
    let Some(submitted) = submitted else {
        return false;
    };

    match (submitted, correct) {
        (Answer::Text(given), Answer::Text(expected)) => given == expected,
        (Answer::List(given), Answer::List(expected)) => given == expected,
        (Answer::Map(given), Answer::Map(expected)) => given == expected,
        (
            Answer::Justified {
                selection: given_selection,
                justification: given_justification,
            },
            Answer::Justified {
                selection: expected_selection,
                justification: expected_justification,
            },
        ) => given_selection == expected_selection && given_justification == expected_justification,
        // Mismatched shapes are simply not equal.
        _ => false,
    }
}

/// Per-exam scoring outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub score: u32,
    pub total_points: u32,
    /// Ids of the questions answered correctly, in exam order.
    pub correct_question_ids: Vec<String>,
}

/// Scores `answers` against every question of `exam`, in exam order.
///
/// `total_points` depends only on the exam's questions. Answers keyed by ids
/// that are not in the exam are ignored.
pub fn grade(exam: &Exam, answers: &StudentAnswers) -> Grade {
    let mut score = 0;
    let mut total_points = 0;
    let mut correct_question_ids = Vec::new();

    for question in &exam.questions {
        if answers_equal(answers.get(&question.id), &question.correct_answer) {
            score += question.points;
            correct_question_ids.push(question.id.clone());
        }
        total_points += question.points;
    }

    Grade {
        score,
        total_points,
        correct_question_ids,
    }
}

/// Reads each answer for a known question as that question's shape.
/// Answers keyed by unknown ids pass through untouched.
pub fn fit_answers(exam: &Exam, answers: StudentAnswers) -> StudentAnswers {
    answers
        .into_iter()
        .map(|(id, answer)| {
            let answer = match exam.question(&id) {
                Some(question) => answer.fit_to(question.question_type),
                None => answer,
            };
            (id, answer)
        })
        .collect()
}

/// Rejects a submission whose answer for a known question has the wrong shape.
pub fn check_answer_shapes(exam: &Exam, answers: &StudentAnswers) -> Result<(), AppError> {
    for question in &exam.questions {
        if let Some(answer) = answers.get(&question.id) {
            if !answer.conforms_to(question.question_type) {
                return Err(shape_error(question));
            }
        }
    }
    Ok(())
}

fn shape_error(question: &Question) -> AppError {
    AppError::Validation(format!(
        "Answer for question '{}' must be {}",
        question.id,
        question.question_type.answer_shape().describe()
    ))
}
