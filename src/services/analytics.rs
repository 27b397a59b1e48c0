// src/services/analytics.rs

use crate::{
    config::PASSING_SCORE_PERCENTAGE,
    models::{
        exam::Exam,
        exam_result::{ExamAnalytics, ExamResult, QuestionAnalytics, Severity},
    },
    services::grading::answers_equal,
};

fn rate(count: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    f64::from(count) / f64::from(attempts) * 100.0
}

/// Aggregates the results of one exam.
///
/// Per-question correctness is re-evaluated against the exam's current questions,
/// so questions added after an attempt count as unanswered for it.
pub fn exam_analytics(exam: &Exam, results: &[ExamResult]) -> ExamAnalytics {
    let attempts = results.len() as u32;
    let percentages: Vec<f64> = results.iter().map(ExamResult::percentage).collect();

    let average_percentage = if percentages.is_empty() {
        0.0
    } else {
        percentages.iter().sum::<f64>() / percentages.len() as f64
    };
    let highest_percentage = percentages.iter().cloned().fold(0.0, f64::max);
    let lowest_percentage = if percentages.is_empty() {
        0.0
    } else {
        percentages.iter().cloned().fold(f64::INFINITY, f64::min)
    };
    let passed = percentages
        .iter()
        .filter(|p| **p >= PASSING_SCORE_PERCENTAGE)
        .count() as u32;

    let high_severity_events = results
        .iter()
        .flat_map(|r| &r.proctoring_events)
        .filter(|e| e.severity == Some(Severity::High))
        .count() as u32;

    let questions = exam
        .questions
        .iter()
        .map(|question| {
            let correct_count = results
                .iter()
                .filter(|r| answers_equal(r.answers.get(&question.id), &question.correct_answer))
                .count() as u32;
            QuestionAnalytics {
                question_id: question.id.clone(),
                text: question.text.clone(),
                correct_count,
                correct_rate: rate(correct_count, attempts),
            }
        })
        .collect();

    ExamAnalytics {
        exam_id: exam.id.clone(),
        exam_title: exam.title.clone(),
        attempts,
        average_percentage,
        highest_percentage,
        lowest_percentage,
        pass_rate: rate(passed, attempts),
        high_severity_events,
        questions,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{
        exam_result::{ProctoringEvent, ProctoringEventType, StudentAnswers},
        question::{Answer, Difficulty, Question, QuestionType},
    };

    fn exam() -> Exam {
        let question = |id: &str, points: u32, answer: &str| Question {
            id: id.to_string(),
            owner_id: "teacher-1".to_string(),
            text: format!("Question {id}"),
            question_type: QuestionType::ShortAnswer,
            options: Vec::new(),
            category: "General".to_string(),
            sub_category: None,
            tags: Vec::new(),
            points,
            correct_answer: Answer::Text(answer.to_string()),
            status: None,
            difficulty: None,
            created_at: Utc::now(),
        };
        Exam {
            id: "exam-1".to_string(),
            owner_id: "teacher-1".to_string(),
            title: "Analytics".to_string(),
            description: None,
            duration: 10,
            difficulty: Difficulty::Easy,
            questions: vec![question("a", 6, "yes"), question("b", 4, "no")],
            question_count: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn result(score: u32, answers: &[(&str, &str)], events: Vec<ProctoringEvent>) -> ExamResult {
        ExamResult {
            id: uuid::Uuid::new_v4().to_string(),
            exam_id: "exam-1".to_string(),
            exam_title: "Analytics".to_string(),
            user_id: "u".to_string(),
            user_name: "u".to_string(),
            submitted_at: Utc::now(),
            score,
            total_points: 10,
            answers: answers
                .iter()
                .map(|(k, v)| (k.to_string(), Answer::Text(v.to_string())))
                .collect::<StudentAnswers>(),
            proctoring_events: events,
        }
    }

    #[test]
    fn no_attempts_is_all_zero() {
        let analytics = exam_analytics(&exam(), &[]);
        assert_eq!(analytics.attempts, 0);
        assert_eq!(analytics.average_percentage, 0.0);
        assert_eq!(analytics.lowest_percentage, 0.0);
        assert_eq!(analytics.pass_rate, 0.0);
        assert_eq!(analytics.questions.len(), 2);
    }

    #[test]
    fn aggregates_scores_and_questions() {
        let flagged = ProctoringEvent {
            event_type: ProctoringEventType::MultipleFaces,
            timestamp: 1_000,
            severity: Some(Severity::High),
            details: None,
        };
        let results = vec![
            result(10, &[("a", "yes"), ("b", "no")], vec![flagged.clone()]),
            result(6, &[("a", "yes"), ("b", "maybe")], Vec::new()),
            result(0, &[], vec![flagged]),
            result(4, &[("b", "no")], Vec::new()),
        ];
        let analytics = exam_analytics(&exam(), &results);

        assert_eq!(analytics.attempts, 4);
        assert_eq!(analytics.average_percentage, 50.0);
        assert_eq!(analytics.highest_percentage, 100.0);
        assert_eq!(analytics.lowest_percentage, 0.0);
        // 100% and 60% pass.
        assert_eq!(analytics.pass_rate, 50.0);
        assert_eq!(analytics.high_severity_events, 2);
        assert_eq!(analytics.questions[0].correct_count, 2);
        assert_eq!(analytics.questions[1].correct_count, 2);
        assert_eq!(analytics.questions[1].correct_rate, 50.0);
    }
}
