use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

mod id;

pub mod ads;
pub mod comments;
pub mod likes;
pub mod messages;
pub mod posts;
pub mod tags;
pub mod users;

pub use id::Id;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// SQLite-backed document store. One typed collection per entity, each
/// implemented as an `impl Store` block in its own module.
///
/// Embedded sub-documents (a post's tag set, a comment's author snapshot)
/// live in JSON columns.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        password BLOB NOT NULL,
        image TEXT,
        role TEXT NOT NULL DEFAULT 'user',
        gender TEXT,
        birth_date TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        image TEXT,
        is_public BOOLEAN NOT NULL DEFAULT FALSE,
        tags TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS comments (
        id TEXT PRIMARY KEY,
        post_id TEXT NOT NULL,
        body TEXT NOT NULL,
        user TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS likes (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        post_id TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tags (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        user_id TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        sender_id TEXT NOT NULL,
        receiver_id TEXT,
        message TEXT NOT NULL,
        is_public BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TEXT NOT NULL,
        seen_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS ads (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        image TEXT,
        price INTEGER NOT NULL,
        duration INTEGER NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
];

impl Store {
    /// Connect to the database named by `database_url` and apply the schema.
    /// The schema statements are idempotent, so reconnecting is always safe.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|_| StoreError::InvalidDatabaseUrl(database_url.to_string()))?
            .create_if_missing(true);

        // An in-memory database vanishes when its last connection closes, so
        // the pool is capped at a single connection for that URL form.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.apply_schema().await?;

        info!("Connected store at {}", database_url);
        Ok(store)
    }

    async fn apply_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Pings the pool to ensure connectivity.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Renders `?, ?, ...` for a dynamically sized `IN (...)` list.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_placeholder_lists() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[tokio::test]
    async fn connects_and_pings_in_memory() {
        let store = Store::connect("sqlite::memory:").await.expect("connect");
        store.ping().await.expect("ping");
    }

    #[tokio::test]
    async fn schema_application_is_idempotent() {
        let store = Store::connect("sqlite::memory:").await.expect("connect");
        store.apply_schema().await.expect("reapply");
    }
}
