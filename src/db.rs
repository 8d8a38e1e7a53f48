use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use time::{macros::format_description, OffsetDateTime};

use crate::config::AppConfig;

/// Opens the shared SQLite pool, creating the database file if it does not exist yet.
pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("parse database url {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .context("connect to database")?;
    tracing::debug!(url = %config.database_url, "database pool ready");
    Ok(pool)
}

pub async fn migrate(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run database migrations")?;
    Ok(())
}

/// Current UTC time as stored in the `created` / `apply_time` columns.
///
/// The fixed `YYYY-MM-DD HH:MM:SS` layout keeps date filters a plain text
/// comparison and makes the first ten characters the posting date.
pub fn now_timestamp() -> anyhow::Result<String> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::now_utc()
        .format(format)
        .context("format timestamp")
}
