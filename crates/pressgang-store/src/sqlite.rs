use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;

use crate::{AgentLog, Error, LogLevel, Store, StoredEvent};

/// SQLite-based store implementation.
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if needed) a database file and apply the schema.
  pub async fn open(path: &Path) -> Result<Self, Error> {
    let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// An in-memory database, mainly for tests.
  ///
  /// Every connection to `sqlite::memory:` sees its own database, so the pool
  /// is capped at one connection.
  pub async fn in_memory() -> Result<Self, Error> {
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .connect("sqlite::memory:")
      .await?;

    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), Error> {
    sqlx::migrate!().run(&self.pool).await?;
    Ok(())
  }
}

#[async_trait]
impl Store for SqliteStore {
  async fn create_event(
    &self,
    agent_id: i64,
    payload: &serde_json::Value,
    created_at: DateTime<Utc>,
  ) -> Result<StoredEvent, Error> {
    let event = sqlx::query_as(
      r#"
            INSERT INTO events (agent_id, payload, created_at)
            VALUES (?, ?, ?)
            RETURNING id, agent_id, payload, created_at
            "#,
    )
    .bind(agent_id)
    .bind(Json(payload))
    .bind(created_at)
    .fetch_one(&self.pool)
    .await?;

    Ok(event)
  }

  async fn get_event(&self, event_id: i64) -> Result<StoredEvent, Error> {
    sqlx::query_as(
      r#"
            SELECT id, agent_id, payload, created_at
            FROM events
            WHERE id = ?
            "#,
    )
    .bind(event_id)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("event {}", event_id)))
  }

  async fn latest_event(&self, agent_id: i64) -> Result<Option<StoredEvent>, Error> {
    let event = sqlx::query_as(
      r#"
            SELECT id, agent_id, payload, created_at
            FROM events
            WHERE agent_id = ?
            ORDER BY id DESC
            LIMIT 1
            "#,
    )
    .bind(agent_id)
    .fetch_optional(&self.pool)
    .await?;

    Ok(event)
  }

  async fn list_events(&self, agent_id: i64) -> Result<Vec<StoredEvent>, Error> {
    let events = sqlx::query_as(
      r#"
            SELECT id, agent_id, payload, created_at
            FROM events
            WHERE agent_id = ?
            ORDER BY id DESC
            "#,
    )
    .bind(agent_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(events)
  }

  async fn create_log(
    &self,
    agent_id: i64,
    level: LogLevel,
    message: &str,
    created_at: DateTime<Utc>,
  ) -> Result<AgentLog, Error> {
    let log = sqlx::query_as(
      r#"
            INSERT INTO agent_logs (agent_id, level, message, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, agent_id, level, message, created_at
            "#,
    )
    .bind(agent_id)
    .bind(level)
    .bind(message)
    .bind(created_at)
    .fetch_one(&self.pool)
    .await?;

    Ok(log)
  }

  async fn latest_error_log(&self, agent_id: i64) -> Result<Option<AgentLog>, Error> {
    let log = sqlx::query_as(
      r#"
            SELECT id, agent_id, level, message, created_at
            FROM agent_logs
            WHERE agent_id = ? AND level = ?
            ORDER BY id DESC
            LIMIT 1
            "#,
    )
    .bind(agent_id)
    .bind(LogLevel::Error)
    .fetch_optional(&self.pool)
    .await?;

    Ok(log)
  }
}
