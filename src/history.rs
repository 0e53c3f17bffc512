//! Bridges between an agent run and the history store.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pressgang_agent::{HealthSnapshot, OutgoingEvent, ReceiveReport};
use pressgang_store::{LogLevel, Store, StoredEvent};
use tokio::sync::mpsc;
use tracing::error;

/// Write every emitted event as a JSON line, then record the batch.
///
/// All senders of `emitted` must be dropped first. Events are written before
/// anything is stored, so a store failure never hides posts that exist.
pub async fn finish_batch<S, W>(
  store: &S,
  agent_id: i64,
  report: &ReceiveReport,
  mut emitted: mpsc::UnboundedReceiver<OutgoingEvent>,
  out: &mut W,
  now: DateTime<Utc>,
) -> Result<()>
where
  S: Store + ?Sized,
  W: Write,
{
  while let Some(event) = emitted.recv().await {
    writeln!(out, "{}", serde_json::to_string(&event.to_payload())?)
      .context("failed to write emitted event")?;
  }
  out.flush().context("failed to write emitted events")?;

  if let Err(e) = record_report(store, agent_id, report, now).await {
    error!(agent_id, error = %e, "batch published but history was not recorded");
    return Err(e);
  }
  Ok(())
}

/// Store the events a batch emitted and an error log per failed event.
pub async fn record_report<S: Store + ?Sized>(
  store: &S,
  agent_id: i64,
  report: &ReceiveReport,
  now: DateTime<Utc>,
) -> Result<()> {
  for event in &report.emitted {
    store
      .create_event(agent_id, &event.to_payload(), now)
      .await
      .context("failed to record emitted event")?;
  }

  for failure in &report.failures {
    let message = match failure.post_id() {
      Some(post_id) => format!(
        "event {} from agent {} failed after creating post {}: {}",
        failure.event_id, failure.agent_id, post_id, failure.error
      ),
      None => format!(
        "event {} from agent {} failed: {}",
        failure.event_id, failure.agent_id, failure.error
      ),
    };
    store
      .create_log(agent_id, LogLevel::Error, &message, now)
      .await
      .context("failed to record error log")?;
  }

  Ok(())
}

/// Stored events for an agent, newest first, or the single event `id`.
pub async fn stored_events<S: Store + ?Sized>(
  store: &S,
  agent_id: i64,
  id: Option<i64>,
) -> Result<Vec<StoredEvent>> {
  match id {
    Some(id) => {
      let event = store
        .get_event(id)
        .await
        .with_context(|| format!("failed to load event {}", id))?;
      Ok(vec![event])
    }
    None => store
      .list_events(agent_id)
      .await
      .context("failed to list events"),
  }
}

/// Collect what the health check needs from the store.
pub async fn health_snapshot<S: Store + ?Sized>(store: &S, agent_id: i64) -> Result<HealthSnapshot> {
  let latest = store
    .latest_event(agent_id)
    .await
    .context("failed to load latest event")?;
  let recent_error_logs = store
    .recent_error_logs(agent_id)
    .await
    .context("failed to check error logs")?;

  Ok(HealthSnapshot {
    last_event_at: latest.as_ref().map(|e| e.created_at),
    most_recent_event: latest.map(|e| e.payload.0),
    recent_error_logs,
  })
}
