// tests/api_tests.rs

use std::{net::SocketAddr, sync::Arc};

use assessment::{
    config::Config, db, routes, seed::seed_admin_user, services::TemplateGenerator,
    state::AppState,
};
use serde_json::{Value, json};

const ADMIN_USERNAME: &str = "root_admin";
const ADMIN_PASSWORD: &str = "admin_password";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    let mut config = Config::for_tests();
    config.admin_username = Some(ADMIN_USERNAME.to_string());
    config.admin_password = Some(ADMIN_PASSWORD.to_string());

    // 1. Fresh in-memory database per test, migrated
    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to open test database");
    seed_admin_user(&pool, &config)
        .await
        .expect("Failed to seed admin");

    // 2. Create the router with the app state
    let state = AppState {
        pool,
        config,
        generator: Arc::new(TemplateGenerator),
    };
    let app = routes::create_router(state);

    // 3. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 4. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    address
}

fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

/// Logs in and returns (token, user_id).
async fn login(
    client: &reqwest::Client,
    address: &str,
    username: &str,
    password: &str,
) -> (String, String) {
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    (
        body["token"].as_str().unwrap().to_string(),
        body["user_id"].as_str().unwrap().to_string(),
    )
}

/// Registers a fresh user with the given role and logs in.
/// Returns (token, user_id, username).
async fn register_and_login(
    client: &reqwest::Client,
    address: &str,
    role: &str,
) -> (String, String, String) {
    let username = unique_name(role.split('_').next().unwrap());
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": username, "password": "password123", "role": role }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(response.status().as_u16(), 201);

    let (token, user_id) = login(client, address, &username, "password123").await;
    (token, user_id, username)
}

fn geography_exam() -> Value {
    json!({
        "title": "Geography and Maths",
        "duration": 30,
        "difficulty": "Easy",
        "questions": [
            {
                "id": "q1",
                "text": "Capital of France?",
                "type": "single_choice",
                "options": ["Paris", "Lyon", "Nice"],
                "category": "Geography",
                "points": 5,
                "correct_answer": "Paris"
            },
            {
                "id": "q2",
                "text": "Pick the primes",
                "type": "multi_select",
                "options": ["2", "3", "4", "5"],
                "category": "Maths",
                "points": 10,
                "correct_answer": ["2", "3", "5"]
            }
        ]
    })
}

async fn create_exam(client: &reqwest::Client, address: &str, token: &str) -> String {
    let response = client
        .post(format!("{}/api/exams", address))
        .bearer_auth(token)
        .json(&geography_exam())
        .send()
        .await
        .expect("Failed to create exam");
    assert_eq!(response.status().as_u16(), 201);

    let exam: Value = response.json().await.unwrap();
    assert_eq!(exam["question_count"], 2);
    exam["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({
            "username": unique_name("u"),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "examinee");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Username too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({
            "username": "yo",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn register_rejects_admin_role_and_duplicates() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_name("u");

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": username, "password": "password123", "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let first = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": username, "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": username, "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, _, username) = register_and_login(&client, &address, "examinee").await;

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({ "username": username, "password": "not_the_password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn protected_routes_require_token_and_role() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let anonymous = client
        .get(format!("{}/api/exams", address))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);

    let (student_token, _, _) = register_and_login(&client, &address, "examinee").await;

    let create = client
        .post(format!("{}/api/exams", address))
        .bearer_auth(&student_token)
        .json(&geography_exam())
        .send()
        .await
        .unwrap();
    assert_eq!(create.status().as_u16(), 403);

    let admin_only = client
        .get(format!("{}/api/admin/users", address))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap();
    assert_eq!(admin_only.status().as_u16(), 403);
}

#[tokio::test]
async fn exam_submission_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let (teacher_token, _, _) = register_and_login(&client, &address, "teacher").await;
    let exam_id = create_exam(&client, &address, &teacher_token).await;

    let (student_token, student_id, student_name) =
        register_and_login(&client, &address, "examinee").await;

    // 1. Examinee sees the exam without correct answers
    let exam: Value = client
        .get(format!("{}/api/exams/{}", address, exam_id))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exam["total_points"], 15);
    assert!(exam["questions"][0].get("correct_answer").is_none());

    // 2. Submit: q1 right, q2 missing one prime
    let response = client
        .post(format!("{}/api/exams/{}/submit", address, exam_id))
        .bearer_auth(&student_token)
        .json(&json!({
            "answers": { "q1": "Paris", "q2": ["2", "3"] },
            "proctoring_events": [
                { "type": "tab_switch", "timestamp": 1700000000000u64, "severity": "medium" }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let result: Value = response.json().await.unwrap();
    assert_eq!(result["score"], 5);
    assert_eq!(result["total_points"], 15);
    assert_eq!(result["user_id"], student_id.as_str());
    assert_eq!(result["user_name"], student_name.as_str());
    assert_eq!(result["exam_title"], "Geography and Maths");
    let result_id = result["id"].as_str().unwrap().to_string();

    // 3. Result history
    let mine: Value = client
        .get(format!("{}/api/results/me", address))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["id"], result_id.as_str());

    // 4. Review joins the exam with its correct answers
    let review: Value = client
        .get(format!("{}/api/results/{}", address, result_id))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(review["result"]["id"], result_id.as_str());
    assert_eq!(review["exam"]["id"], exam_id.as_str());
    assert_eq!(review["exam"]["questions"][0]["correct_answer"], "Paris");

    // 5. Leaderboard
    let leaderboard: Value = client
        .get(format!("{}/api/exams/{}/leaderboard", address, exam_id))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(leaderboard[0]["user_name"], student_name.as_str());
    assert_eq!(leaderboard[0]["score"], 5);

    // 6. Owner analytics
    let analytics: Value = client
        .get(format!("{}/api/exams/{}/analytics", address, exam_id))
        .bearer_auth(&teacher_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(analytics["attempts"], 1);
}

#[tokio::test]
async fn submission_errors_store_nothing() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let (teacher_token, _, _) = register_and_login(&client, &address, "teacher").await;
    let exam_id = create_exam(&client, &address, &teacher_token).await;
    let (student_token, _, _) = register_and_login(&client, &address, "examinee").await;

    let missing = client
        .post(format!("{}/api/exams/{}/submit", address, "no-such-exam"))
        .bearer_auth(&student_token)
        .json(&json!({ "answers": { "q1": "Paris" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);

    // A list where a single choice is expected
    let wrong_shape = client
        .post(format!("{}/api/exams/{}/submit", address, exam_id))
        .bearer_auth(&student_token)
        .json(&json!({ "answers": { "q1": ["Paris"] } }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_shape.status().as_u16(), 400);

    let mine: Value = client
        .get(format!("{}/api/results/me", address))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn results_are_private_to_submitter_and_owner() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let (teacher_token, _, _) = register_and_login(&client, &address, "teacher").await;
    let exam_id = create_exam(&client, &address, &teacher_token).await;
    let (student_token, _, _) = register_and_login(&client, &address, "examinee").await;
    let (other_token, _, _) = register_and_login(&client, &address, "examinee").await;

    let result: Value = client
        .post(format!("{}/api/exams/{}/submit", address, exam_id))
        .bearer_auth(&student_token)
        .json(&json!({ "answers": { "q1": "Lyon" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result["score"], 0);
    let result_url = format!("{}/api/results/{}", address, result["id"].as_str().unwrap());

    let other = client.get(&result_url).bearer_auth(&other_token).send().await.unwrap();
    assert_eq!(other.status().as_u16(), 404);

    let owner = client.get(&result_url).bearer_auth(&teacher_token).send().await.unwrap();
    assert_eq!(owner.status().as_u16(), 200);

    // Deleting the exam keeps the result but review is gone
    let deleted = client
        .delete(format!("{}/api/exams/{}", address, exam_id))
        .bearer_auth(&teacher_token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let review = client.get(&result_url).bearer_auth(&student_token).send().await.unwrap();
    assert_eq!(review.status().as_u16(), 404);

    let mine: Value = client
        .get(format!("{}/api/results/me", address))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn question_review_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let (teacher_token, _, _) = register_and_login(&client, &address, "teacher").await;
    let (admin_token, _) = login(&client, &address, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // 1. New bank questions start as drafts
    let question: Value = client
        .post(format!("{}/api/questions", address))
        .bearer_auth(&teacher_token)
        .json(&json!({
            "text": "The earth is flat.",
            "type": "true_false",
            "options": ["True", "False"],
            "category": "Science",
            "tags": ["Astronomy"],
            "points": 2,
            "correct_answer": "False"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(question["status"], "draft");
    assert_eq!(question["tags"][0], "astronomy");
    let question_id = question["id"].as_str().unwrap().to_string();
    let review_url = format!("{}/api/questions/{}/review", address, question_id);

    // 2. Drafts cannot be approved directly
    let skip = client
        .post(&review_url)
        .bearer_auth(&admin_token)
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(skip.status().as_u16(), 409);

    // 3. Owner submits for review
    let submit = client
        .post(&review_url)
        .bearer_auth(&teacher_token)
        .json(&json!({ "status": "pending" }))
        .send()
        .await
        .unwrap();
    assert_eq!(submit.status().as_u16(), 200);

    // 4. Pending questions cannot join an exam yet
    let exam_id = create_exam(&client, &address, &teacher_token).await;
    let add_url = format!("{}/api/exams/{}/questions", address, exam_id);
    let early = client
        .post(&add_url)
        .bearer_auth(&teacher_token)
        .json(&json!({ "question_ids": [question_id] }))
        .send()
        .await
        .unwrap();
    assert_eq!(early.status().as_u16(), 400);

    // 5. Only an admin gives the verdict
    let self_approve = client
        .post(&review_url)
        .bearer_auth(&teacher_token)
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(self_approve.status().as_u16(), 403);

    let approve = client
        .post(&review_url)
        .bearer_auth(&admin_token)
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(approve.status().as_u16(), 200);

    // 6. Approved questions are copied into the exam
    let exam: Value = client
        .post(&add_url)
        .bearer_auth(&teacher_token)
        .json(&json!({ "question_ids": [question_id] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exam["question_count"], 3);
    assert_eq!(exam["questions"][2]["id"], question_id.as_str());

    let again = client
        .post(&add_url)
        .bearer_auth(&teacher_token)
        .json(&json!({ "question_ids": [question_id] }))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 409);
}

#[tokio::test]
async fn generated_questions_await_review() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _, _) = register_and_login(&client, &address, "corporate").await;

    let response = client
        .post(format!("{}/api/questions/generate", address))
        .bearer_auth(&token)
        .json(&json!({
            "topic": "Rust ownership",
            "type": "ordering",
            "difficulty": "Hard",
            "count": 3
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let questions: Value = response.json().await.unwrap();
    let questions = questions.as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions.iter().all(|q| q["status"] == "pending"));
    assert!(questions.iter().all(|q| q["type"] == "ordering"));
}

#[tokio::test]
async fn candidate_pipeline_and_interviews() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _, _) = register_and_login(&client, &address, "training_company").await;

    // 1. New candidates land in the first column
    let candidate: Value = client
        .post(format!("{}/api/candidates", address))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "position": "Engineer"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(candidate["stage"], "applied");
    let candidate_id = candidate["id"].as_str().unwrap().to_string();

    // 2. Move it along
    let moved: Value = client
        .post(format!("{}/api/candidates/{}/stage", address, candidate_id))
        .bearer_auth(&token)
        .json(&json!({ "stage": "interview" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(moved["stage"], "interview");

    let board: Value = client
        .get(format!("{}/api/candidates", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let board = board.as_array().unwrap();
    assert_eq!(board.len(), 7);
    let column = board.iter().find(|c| c["stage"] == "interview").unwrap();
    assert_eq!(column["candidates"][0]["id"], candidate_id.as_str());

    // 3. Schedule, then clash with the same slot
    let interviews_url = format!("{}/api/candidates/{}/interviews", address, candidate_id);
    let start = chrono::Utc::now() + chrono::Duration::days(1);

    let interview: Value = client
        .post(&interviews_url)
        .bearer_auth(&token)
        .json(&json!({ "scheduled_at": start.to_rfc3339(), "duration_minutes": 60 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(interview["status"], "scheduled");
    assert!(
        interview["meeting_url"]
            .as_str()
            .unwrap()
            .starts_with("https://meet.example.test/rooms/interview-")
    );

    let clash_start = start + chrono::Duration::minutes(30);
    let clash = client
        .post(&interviews_url)
        .bearer_auth(&token)
        .json(&json!({ "scheduled_at": clash_start.to_rfc3339(), "duration_minutes": 30 }))
        .send()
        .await
        .unwrap();
    assert_eq!(clash.status().as_u16(), 409);

    // 4. Cancelling frees the slot
    let cancel = client
        .post(format!(
            "{}/api/interviews/{}/cancel",
            address,
            interview["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(cancel.status().as_u16(), 200);

    let retry = client
        .post(&interviews_url)
        .bearer_auth(&token)
        .json(&json!({ "scheduled_at": clash_start.to_rfc3339(), "duration_minutes": 30 }))
        .send()
        .await
        .unwrap();
    assert_eq!(retry.status().as_u16(), 201);
}

#[tokio::test]
async fn concurrent_scheduling_books_a_slot_once() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _, _) = register_and_login(&client, &address, "corporate").await;

    let candidate: Value = client
        .post(format!("{}/api/candidates", address))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Grace Hopper",
            "email": "grace@example.com",
            "position": "Engineer"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let interviews_url = format!(
        "{}/api/candidates/{}/interviews",
        address,
        candidate["id"].as_str().unwrap()
    );
    let start = (chrono::Utc::now() + chrono::Duration::days(2)).to_rfc3339();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        let url = interviews_url.clone();
        let token = token.clone();
        let body = json!({ "scheduled_at": start, "duration_minutes": 60 });
        handles.push(tokio::spawn(async move {
            client
                .post(&url)
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        }));
    }

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }
    assert_eq!(statuses.iter().filter(|s| **s == 201).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == 409).count(), 7);

    let interviews: Value = client
        .get(&interviews_url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(interviews.as_array().unwrap().len(), 1);
}
