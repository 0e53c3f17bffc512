//! Liveness evaluation from event history.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// What the health check needs to know about an agent's history.
///
/// The host fills this in from wherever events and logs are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
  /// When the agent last emitted an event.
  pub last_event_at: Option<DateTime<Utc>>,
  /// Payload of the most recent emitted event.
  pub most_recent_event: Option<serde_json::Value>,
  /// Whether error logs were written around or after the last event.
  pub recent_error_logs: bool,
}

/// Whether an agent is working.
///
/// All of the following must hold, checked in this order:
/// 1. an event was emitted within the last `expected_update_period_in_days`
/// 2. a most recent event exists
/// 3. its payload has `success: true`
/// 4. there are no recent error logs
pub fn evaluate(
  snapshot: &HealthSnapshot,
  expected_update_period_in_days: u32,
  now: DateTime<Utc>,
) -> bool {
  event_created_within(snapshot, expected_update_period_in_days, now)
    && snapshot
      .most_recent_event
      .as_ref()
      .is_some_and(|payload| payload.get("success") == Some(&serde_json::Value::Bool(true)))
    && !snapshot.recent_error_logs
}

/// A window reaching past the earliest representable time covers every event.
fn event_created_within(snapshot: &HealthSnapshot, days: u32, now: DateTime<Utc>) -> bool {
  let since = now.checked_sub_signed(Duration::days(i64::from(days)));
  snapshot
    .last_event_at
    .is_some_and(|at| since.is_none_or(|since| at > since))
}
