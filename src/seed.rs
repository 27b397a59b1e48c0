// src/seed.rs

use std::collections::BTreeMap;

use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    models::{
        exam::CreateExamRequest,
        question::{Answer, Difficulty, QuestionInput, QuestionStatus, QuestionType},
        user::Role,
    },
    repository::{ExamRepository, QuestionRepository, UserRepository},
    utils::hash::hash_password,
};

/// Creates the configured admin account if it does not exist yet.
pub async fn seed_admin_user(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        let users = UserRepository::new(pool);
        if users.find_by_username(username).await?.is_none() {
            tracing::info!("Seeding admin user: {}", username);
            let hashed_password = hash_password(password)?;
            users.create(username, &hashed_password, Role::Admin).await?;
            tracing::info!("Admin user created successfully.");
        }
    }
    Ok(())
}

fn input(
    text: &str,
    question_type: QuestionType,
    options: &[&str],
    points: u32,
    correct_answer: Answer,
) -> QuestionInput {
    QuestionInput {
        id: None,
        text: text.to_string(),
        question_type,
        options: options.iter().map(|s| s.to_string()).collect(),
        category: "General Knowledge".to_string(),
        sub_category: None,
        tags: vec!["demo".to_string()],
        points,
        correct_answer,
        difficulty: Some(Difficulty::Easy),
    }
}

/// Demo accounts, a sample exam and a few bank questions. Skipped if already present.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<(), AppError> {
    let users = UserRepository::new(pool);
    if users.find_by_username("demo_teacher").await?.is_some() {
        return Ok(());
    }

    let password = hash_password("password123")?;
    let teacher = users.create("demo_teacher", &password, Role::Teacher).await?;
    users.create("demo_corporate", &password, Role::Corporate).await?;
    users.create("demo_training", &password, Role::TrainingCompany).await?;
    users.create("demo_student", &password, Role::Examinee).await?;

    let mut matching = BTreeMap::new();
    matching.insert("France".to_string(), "Paris".to_string());
    matching.insert("Japan".to_string(), "Tokyo".to_string());

    let exam = CreateExamRequest {
        title: "World Basics".to_string(),
        description: Some("A short demo exam covering each answer shape.".to_string()),
        duration: 15,
        difficulty: Difficulty::Easy,
        questions: vec![
            input(
                "What is the capital of France?",
                QuestionType::SingleChoice,
                &["Paris", "Lyon", "Marseille"],
                5,
                Answer::Text("Paris".to_string()),
            ),
            input(
                "Select the prime numbers.",
                QuestionType::MultiSelect,
                &["2", "4", "7", "9", "11"],
                10,
                Answer::List(vec!["2".into(), "7".into(), "11".into()]),
            ),
            input(
                "Order the planets from the Sun outward.",
                QuestionType::Ordering,
                &["Mars", "Mercury", "Earth"],
                6,
                Answer::List(vec!["Mercury".into(), "Earth".into(), "Mars".into()]),
            ),
            input(
                "Match each country to its capital.",
                QuestionType::Matching,
                &["Tokyo", "Paris"],
                4,
                Answer::Map(matching),
            ),
            input(
                "The Pacific is the largest ocean. Justify.",
                QuestionType::TrueFalseJustification,
                &["true", "false"],
                5,
                Answer::Justified {
                    selection: "true".to_string(),
                    justification: "It covers about a third of the Earth's surface.".to_string(),
                },
            ),
        ],
        question_count: None,
    }
    .into_exam(&teacher.id)?;
    ExamRepository::new(pool).insert(&exam).await?;

    let bank = QuestionRepository::new(pool);
    let bank_questions = [
        (
            input(
                "Water boils at 100 degrees Celsius at sea level.",
                QuestionType::TrueFalse,
                &["true", "false"],
                2,
                Answer::Text("true".to_string()),
            ),
            QuestionStatus::Approved,
        ),
        (
            input(
                "Name the longest river in Africa.",
                QuestionType::ShortAnswer,
                &[],
                3,
                Answer::Text("Nile".to_string()),
            ),
            QuestionStatus::Pending,
        ),
    ];
    for (question, status) in bank_questions {
        question.check()?;
        bank.insert(&question.into_question(&teacher.id, Some(status)))
            .await?;
    }

    tracing::info!("Demo data seeded");
    Ok(())
}
