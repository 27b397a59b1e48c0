// src/config.rs

use std::env;

use dotenvy::dotenv;

/// Percentage of `total_points` an attempt needs to count as passed.
pub const PASSING_SCORE_PERCENTAGE: f64 = 60.0;

/// Number of entries returned by an exam leaderboard.
pub const LEADERBOARD_SIZE: i64 = 5;

/// Upper bound for a single question generation request.
pub const MAX_GENERATED_QUESTIONS: u32 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub listen_addr: String,
    pub log_dir: String,
    /// Base URL interview rooms are created under.
    pub meeting_base_url: String,
    /// Token refill interval for register/login, per client IP, in seconds.
    pub auth_rate_per_second: u64,
    pub auth_rate_burst: u32,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let meeting_base_url = env::var("MEETING_BASE_URL")
            .unwrap_or_else(|_| "https://meet.jit.si/".to_string());

        let auth_rate_per_second = env::var("AUTH_RATE_PER_SECOND")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);

        let auth_rate_burst = env::var("AUTH_RATE_BURST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let seed_demo_data = env::var("SEED_DEMO_DATA")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            listen_addr,
            log_dir,
            meeting_base_url,
            auth_rate_per_second,
            auth_rate_burst,
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            seed_demo_data,
        }
    }

    /// Configuration used by tests: in-memory database, short-lived tokens.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test_secret_for_integration_tests".to_string(),
            jwt_expiration: 600,
            rust_log: "error".to_string(),
            listen_addr: "127.0.0.1:0".to_string(),
            log_dir: "logs".to_string(),
            meeting_base_url: "https://meet.example.test/rooms/".to_string(),
            auth_rate_per_second: 1,
            auth_rate_burst: 1000,
            admin_username: None,
            admin_password: None,
            seed_demo_data: false,
        }
    }
}
