// src/main.rs

use std::{net::SocketAddr, sync::Arc};

use assessment::{
    config::Config,
    db, routes,
    seed::{seed_admin_user, seed_demo_data},
    services::TemplateGenerator,
    state::AppState,
};
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "assessment.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to open database");
    tracing::info!("Database ready ({})", config.database_url);

    if let Err(e) = seed_admin_user(&pool, &config).await {
        tracing::error!("Failed to seed admin user: {:?}", e);
    }
    if config.seed_demo_data {
        if let Err(e) = seed_demo_data(&pool).await {
            tracing::error!("Failed to seed demo data: {:?}", e);
        }
    }

    let state = AppState {
        pool,
        config: config.clone(),
        generator: Arc::new(TemplateGenerator),
    };

    let app = routes::create_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .expect("LISTEN_ADDR must be a socket address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
