//! Pressgang Store
//!
//! This crate provides the storage trait and a SQLite implementation for the
//! history the health check reads: events an agent emitted and the log
//! entries it wrote.
//!
//! The [`Store`] trait defines operations for:
//! - Recording emitted events and querying the most recent one
//! - Recording log entries and querying the most recent error
//! - Deciding whether an agent has recent error logs

mod sqlite;
mod types;

pub use sqlite::SqliteStore;
pub use types::{AgentLog, LogLevel, StoredEvent};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Error logs this many minutes before the newest event still count as recent.
pub const ERROR_LOG_GRACE_MINUTES: i64 = 2;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The requested record was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Applying the schema failed.
  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Storage trait for agent events and logs.
#[async_trait]
pub trait Store: Send + Sync {
  /// Record an event emitted by an agent.
  async fn create_event(
    &self,
    agent_id: i64,
    payload: &serde_json::Value,
    created_at: DateTime<Utc>,
  ) -> Result<StoredEvent, Error>;

  /// Get an event by ID.
  async fn get_event(&self, event_id: i64) -> Result<StoredEvent, Error>;

  /// The newest event emitted by an agent.
  async fn latest_event(&self, agent_id: i64) -> Result<Option<StoredEvent>, Error>;

  /// List events emitted by an agent, newest first.
  async fn list_events(&self, agent_id: i64) -> Result<Vec<StoredEvent>, Error>;

  /// Record a log entry for an agent.
  async fn create_log(
    &self,
    agent_id: i64,
    level: LogLevel,
    message: &str,
    created_at: DateTime<Utc>,
  ) -> Result<AgentLog, Error>;

  /// The newest error-level log entry for an agent.
  async fn latest_error_log(&self, agent_id: i64) -> Result<Option<AgentLog>, Error>;

  /// Whether the agent logged an error around or after its newest event.
  async fn recent_error_logs(&self, agent_id: i64) -> Result<bool, Error> {
    let event = self.latest_event(agent_id).await?;
    let error = self.latest_error_log(agent_id).await?;

    Ok(has_recent_error_logs(
      event.map(|e| e.created_at),
      error.map(|l| l.created_at),
    ))
  }
}

/// An error is recent when it was logged later than
/// [`ERROR_LOG_GRACE_MINUTES`] before the newest event. Without both
/// timestamps there is nothing recent.
pub fn has_recent_error_logs(
  last_event_at: Option<DateTime<Utc>>,
  last_error_log_at: Option<DateTime<Utc>>,
) -> bool {
  match (last_event_at, last_error_log_at) {
    (Some(event_at), Some(error_at)) => {
      error_at > event_at - Duration::minutes(ERROR_LOG_GRACE_MINUTES)
    }
    _ => false,
  }
}
