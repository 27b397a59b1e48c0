// src/db.rs

use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::error::AppError;

/// Opens the store and applies migrations.
///
/// An in-memory database lives only as long as its connection, so it gets a
/// single connection that is never recycled. All writes are serialized through it.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
        .map_err(|e| {
            tracing::error!("Failed to open database '{}': {:?}", database_url, e);
            AppError::InternalServerError(e.to_string())
        })?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::debug!("Migrations applied");

    Ok(pool)
}
