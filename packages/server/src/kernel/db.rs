use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Connect with bounded waits: `timeout` caps both pool acquisition and
/// every statement run on the connection.
pub async fn connect(database_url: &str, timeout: Duration) -> Result<PgPool> {
    let options: PgConnectOptions = database_url
        .parse()
        .context("DATABASE_URL is not a valid Postgres URL")?;
    let options = options.options([(
        "statement_timeout",
        format!("{}", timeout.as_millis()),
    )]);

    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(timeout)
        .connect_with(options)
        .await
        .context("Failed to connect to database")
}

/// Apply the embedded SQL migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")
}
