use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// Severity of an agent log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum LogLevel {
  Info,
  Warn,
  Error,
}

/// An event emitted by an agent, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StoredEvent {
  pub id: i64,
  /// The agent that emitted the event.
  pub agent_id: i64,
  pub payload: Json<serde_json::Value>,
  pub created_at: DateTime<Utc>,
}

/// A diagnostic entry written by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AgentLog {
  pub id: i64,
  pub agent_id: i64,
  pub level: LogLevel,
  pub message: String,
  pub created_at: DateTime<Utc>,
}
