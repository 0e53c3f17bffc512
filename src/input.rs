//! Reading a batch of incoming events from text.

use anyhow::{Context, Result, bail};
use pressgang_agent::IncomingEvent;
use serde_json::Value;

/// Agent id given to bare payloads that do not name their source.
pub const STDIN_AGENT_ID: i64 = 0;

/// Parse a batch of events.
///
/// Accepts a JSON array, a single JSON value, or newline-delimited JSON.
/// Each item is either a full event (`{id, agent_id, payload}`) or a bare
/// payload, which is numbered by its position starting at 1.
pub fn parse_events(input: &str) -> Result<Vec<IncomingEvent>> {
  let input = input.trim();
  if input.is_empty() {
    return Ok(Vec::new());
  }

  let items = match serde_json::from_str::<Value>(input) {
    Ok(Value::Array(items)) => items,
    Ok(item) => vec![item],
    Err(_) => parse_lines(input)?,
  };

  items
    .into_iter()
    .enumerate()
    .map(|(index, item)| to_event(index, item))
    .collect()
}

fn parse_lines(input: &str) -> Result<Vec<Value>> {
  input
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(n, line)| {
      serde_json::from_str(line).with_context(|| format!("invalid JSON on input line {}", n + 1))
    })
    .collect()
}

fn to_event(index: usize, item: Value) -> Result<IncomingEvent> {
  if is_full_event(&item) {
    return serde_json::from_value(item)
      .with_context(|| format!("invalid event at position {}", index + 1));
  }

  if !item.is_object() {
    bail!("event at position {} is not a JSON object", index + 1);
  }

  Ok(IncomingEvent {
    id: i64::try_from(index + 1)?,
    agent_id: STDIN_AGENT_ID,
    payload: item,
  })
}

fn is_full_event(item: &Value) -> bool {
  item.get("id").is_some_and(Value::is_i64)
    && item.get("agent_id").is_some_and(Value::is_i64)
    && item.get("payload").is_some()
}
