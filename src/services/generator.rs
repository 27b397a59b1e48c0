// src/services/generator.rs

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::{
    config::MAX_GENERATED_QUESTIONS,
    error::AppError,
    models::question::{Answer, Difficulty, Question, QuestionInput, QuestionStatus, QuestionType},
};

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub count: u32,
    pub owner_id: String,
}

/// Capability that produces new questions for a topic (AI-assisted authoring).
///
/// Implementations only need to return well-formed questions: the answer shape
/// must match the type. Generated questions enter the bank as `pending`.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate_questions(&self, request: &GenerationRequest)
    -> Result<Vec<Question>, AppError>;
}

/// Deterministic, offline generator built from templates.
#[derive(Debug, Default, Clone)]
pub struct TemplateGenerator;

#[async_trait]
impl QuestionGenerator for TemplateGenerator {
    async fn generate_questions(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<Question>, AppError> {
        if request.count == 0 || request.count > MAX_GENERATED_QUESTIONS {
            return Err(AppError::Validation(format!(
                "count must be between 1 and {MAX_GENERATED_QUESTIONS}"
            )));
        }

        let topic = request.topic.trim();
        if topic.is_empty() {
            return Err(AppError::Validation("topic must not be empty".to_string()));
        }

        let mut questions = Vec::with_capacity(request.count as usize);
        for n in 0..request.count as usize {
            let input = template(topic, request.question_type, request.difficulty, n);
            input.check()?;
            questions.push(input.into_question(&request.owner_id, Some(QuestionStatus::Pending)));
        }

        tracing::debug!(
            topic,
            count = questions.len(),
            question_type = request.question_type.as_str(),
            "Generated questions"
        );
        Ok(questions)
    }
}

fn points_for(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 1,
        Difficulty::Medium => 2,
        Difficulty::Hard => 3,
    }
}

fn template(topic: &str, question_type: QuestionType, difficulty: Difficulty, n: usize) -> QuestionInput {
    let number = n + 1;
    let statements: Vec<String> = ["A", "B", "C", "D"]
        .iter()
        .map(|letter| format!("{topic} statement {letter}"))
        .collect();
    let truth = if n % 2 == 0 { "true" } else { "false" };

    let (text, options, correct_answer) = match question_type {
        QuestionType::SingleChoice => (
            format!("Which statement about {topic} is correct? ({number})"),
            statements.clone(),
            Answer::Text(statements[n % 4].clone()),
        ),
        QuestionType::MultiSelect => {
            let first = n % 4;
            let second = (n + 2) % 4;
            let mut picked = vec![first.min(second), first.max(second)];
            picked.dedup();
            (
                format!("Select every correct statement about {topic}. ({number})"),
                statements.clone(),
                Answer::List(picked.into_iter().map(|i| statements[i].clone()).collect()),
            )
        }
        QuestionType::TrueFalse => (
            format!("True or false: {topic} claim #{number} holds."),
            vec!["true".to_string(), "false".to_string()],
            Answer::Text(truth.to_string()),
        ),
        QuestionType::TrueFalseJustification => (
            format!("True or false: {topic} claim #{number} holds. Justify your choice."),
            vec!["true".to_string(), "false".to_string()],
            Answer::Justified {
                selection: truth.to_string(),
                justification: format!("Claim #{number} about {topic} is {truth} by definition."),
            },
        ),
        QuestionType::ShortAnswer => (
            format!("Name the key concept behind {topic}. ({number})"),
            Vec::new(),
            Answer::Text(topic.to_string()),
        ),
        QuestionType::Essay => (
            format!("Discuss the trade-offs of {topic}. ({number})"),
            Vec::new(),
            Answer::Text(format!("A complete discussion of {topic}.")),
        ),
        QuestionType::Ordering => {
            let steps: Vec<String> = (1..=4).map(|i| format!("{topic} step {i}")).collect();
            // Options are shown rotated so the correct order is not the displayed one.
            let mut shown = steps.clone();
            shown.rotate_left(1 + n % 3);
            (
                format!("Put the {topic} steps in order. ({number})"),
                shown,
                Answer::List(steps),
            )
        }
        QuestionType::Matching => {
            let pairs: BTreeMap<String, String> = (1..=3)
                .map(|i| (format!("{topic} term {i}"), format!("{topic} definition {i}")))
                .collect();
            let options = pairs.values().cloned().collect();
            (
                format!("Match each {topic} term to its definition. ({number})"),
                options,
                Answer::Map(pairs),
            )
        }
    };

    QuestionInput {
        id: None,
        text,
        question_type,
        options,
        category: topic.chars().take(100).collect(),
        sub_category: None,
        tags: vec![
            topic.chars().take(50).collect::<String>().to_lowercase(),
            "generated".to_string(),
        ],
        points: points_for(difficulty),
        correct_answer,
        difficulty: Some(difficulty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(question_type: QuestionType, count: u32) -> GenerationRequest {
        GenerationRequest {
            topic: "Ownership".to_string(),
            question_type,
            difficulty: Difficulty::Medium,
            count,
            owner_id: "teacher-1".to_string(),
        }
    }

    #[tokio::test]
    async fn every_type_yields_well_formed_questions() {
        let generator = TemplateGenerator;
        for question_type in QuestionType::ALL {
            let questions = generator
                .generate_questions(&request(question_type, 5))
                .await
                .unwrap();
            assert_eq!(questions.len(), 5);
            for q in &questions {
                assert_eq!(q.question_type, question_type);
                assert!(q.correct_answer.conforms_to(question_type));
                assert_eq!(q.status, Some(QuestionStatus::Pending));
                assert_eq!(q.points, 2);
                assert_eq!(q.owner_id, "teacher-1");
            }
        }
    }

    #[tokio::test]
    async fn generated_ids_are_unique() {
        let questions = TemplateGenerator
            .generate_questions(&request(QuestionType::SingleChoice, 10))
            .await
            .unwrap();
        let mut ids: Vec<_> = questions.iter().map(|q| q.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn count_is_bounded() {
        let generator = TemplateGenerator;
        assert!(generator
            .generate_questions(&request(QuestionType::Essay, 0))
            .await
            .is_err());
        assert!(generator
            .generate_questions(&request(QuestionType::Essay, MAX_GENERATED_QUESTIONS + 1))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn long_non_ascii_topics_generate_for_every_type() {
        let topic = "أساسيات البرمجة الكائنية التوجه ".repeat(6);
        let topic = topic.trim();
        assert!(topic.chars().count() <= 200);
        assert!(topic.len() > 200);

        for question_type in QuestionType::ALL {
            let questions = TemplateGenerator
                .generate_questions(&GenerationRequest {
                    topic: topic.to_string(),
                    ..request(question_type, 4)
                })
                .await
                .unwrap();
            assert_eq!(questions.len(), 4);
            for q in &questions {
                assert!(q.correct_answer.conforms_to(question_type));
                assert!(q.tags.iter().all(|t| t.chars().count() <= 50));
            }
        }
    }
}
