//! Local link table mapping a Telegram chat to its backend restaurant.
//!
//! This is the only persisted state the bot keeps. The default
//! `sqlite::memory:` URL keeps everything in process memory so the binary
//! runs with zero external services; point `DATABASE_URL` at a file to
//! survive restarts.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// One chat→restaurant link.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ChatLink {
    pub chat_id: i64,
    pub restaurant_id: i64,
    pub restaurant_name: String,
}

/// Open the link database.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .context("invalid DATABASE_URL")?
        .create_if_missing(true);

    // An in-memory sqlite database is per-connection; a single-connection
    // pool keeps every query on the same database.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .context("failed to open link database")?;

    Ok(pool)
}

/// Initialize the database schema
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    info!("Initializing link table schema");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS chat_links (
            chat_id INTEGER PRIMARY KEY,
            restaurant_id INTEGER NOT NULL,
            restaurant_name TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("failed to create chat_links table")?;

    Ok(())
}

/// Insert or replace the link for a chat.
pub async fn save_link(
    pool: &SqlitePool,
    chat_id: i64,
    restaurant_id: i64,
    restaurant_name: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO chat_links (chat_id, restaurant_id, restaurant_name)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(chat_id) DO UPDATE SET
            restaurant_id = excluded.restaurant_id,
            restaurant_name = excluded.restaurant_name",
    )
    .bind(chat_id)
    .bind(restaurant_id)
    .bind(restaurant_name)
    .execute(pool)
    .await
    .context("failed to save chat link")?;

    Ok(())
}

/// Look up the link for a chat, if any.
pub async fn get_link(pool: &SqlitePool, chat_id: i64) -> Result<Option<ChatLink>> {
    let link = sqlx::query_as::<_, ChatLink>(
        "SELECT chat_id, restaurant_id, restaurant_name FROM chat_links WHERE chat_id = ?1",
    )
    .bind(chat_id)
    .fetch_optional(pool)
    .await
    .context("failed to read chat link")?;

    Ok(link)
}

/// Remove the link for a chat. Returns whether a row was deleted.
pub async fn delete_link(pool: &SqlitePool, chat_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM chat_links WHERE chat_id = ?1")
        .bind(chat_id)
        .execute(pool)
        .await
        .context("failed to delete chat link")?;

    Ok(result.rows_affected() > 0)
}
