// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, candidates, exams, interviews, questions, results},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, author_middleware},
};

/// Assembles the main application router.
///
/// * Public: register, login.
/// * Authenticated: taking exams, own results, review.
/// * Authoring roles: question bank, exam authoring, analytics, candidate pipeline.
/// * Admin: user management.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_layer = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let mut public_auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Per-IP limit on credential endpoints. Needs ConnectInfo<SocketAddr> at serve time.
    match GovernorConfigBuilder::default()
        .per_second(state.config.auth_rate_per_second)
        .burst_size(state.config.auth_rate_burst)
        .finish()
    {
        Some(governor_conf) => {
            public_auth_routes =
                public_auth_routes.layer(GovernorLayer::new(Arc::new(governor_conf)));
        }
        None => tracing::warn!("Auth rate limit disabled: rate and burst must be non-zero"),
    }

    let me_routes = Router::new()
        .route("/me", get(auth::me))
        .layer(auth_layer.clone());

    // Any signed-in user (examinees included).
    let exam_routes = Router::new()
        .route("/", get(exams::list_exams))
        .route("/{id}", get(exams::get_exam))
        .route("/{id}/submit", post(exams::submit_exam))
        .route("/{id}/leaderboard", get(exams::get_leaderboard))
        .merge(
            Router::new()
                .route("/", post(exams::create_exam))
                .route("/generate", post(exams::generate_exam))
                .route("/{id}", delete(exams::delete_exam).put(exams::update_exam))
                .route("/{id}/questions", post(exams::add_bank_questions))
                .route("/{id}/analytics", get(exams::get_analytics))
                .layer(middleware::from_fn(author_middleware)),
        )
        .layer(auth_layer.clone());

    let result_routes = Router::new()
        .route("/me", get(results::my_results))
        .route("/{id}", get(results::get_result))
        .layer(auth_layer.clone());

    let question_routes = Router::new()
        .route(
            "/",
            get(questions::list_questions).post(questions::create_question),
        )
        .route("/generate", post(questions::generate_questions))
        .route(
            "/{id}",
            get(questions::get_question)
                .put(questions::update_question)
                .delete(questions::delete_question),
        )
        .route("/{id}/review", post(questions::review_question))
        // Auth first, then role check (layers run outside in).
        .layer(middleware::from_fn(author_middleware))
        .layer(auth_layer.clone());

    let candidate_routes = Router::new()
        .route(
            "/",
            get(candidates::get_board).post(candidates::create_candidate),
        )
        .route(
            "/{id}",
            get(candidates::get_candidate).delete(candidates::delete_candidate),
        )
        .route("/{id}/stage", post(candidates::move_candidate))
        .route(
            "/{id}/interviews",
            get(interviews::list_interviews).post(interviews::schedule_interview),
        )
        .layer(middleware::from_fn(author_middleware))
        .layer(auth_layer.clone());

    let interview_routes = Router::new()
        .route("/{id}/cancel", post(interviews::cancel_interview))
        .layer(middleware::from_fn(author_middleware))
        .layer(auth_layer.clone());

    let user_routes = Router::new()
        .route("/{id}/results", get(results::user_results))
        .layer(middleware::from_fn(author_middleware))
        .layer(auth_layer.clone());

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}", delete(admin::delete_user))
        .layer(middleware::from_fn(admin_middleware))
        .layer(auth_layer);

    Router::new()
        .nest("/api/auth", public_auth_routes.merge(me_routes))
        .nest("/api/exams", exam_routes)
        .nest("/api/results", result_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/candidates", candidate_routes)
        .nest("/api/interviews", interview_routes)
        .nest("/api/users", user_routes)
        .nest("/api/admin", admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
