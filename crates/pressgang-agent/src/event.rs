//! Incoming and outgoing event types.
//!
//! An [`IncomingEvent`] only lives for one `receive` call. Every event that is
//! published produces exactly one [`OutgoingEvent`] with `success = true`;
//! failed events optionally produce one with `success = false`.

use pressgang_remote::{PostId, PostResponse};
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// An event delivered to the agent by an upstream agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingEvent {
  pub id: i64,
  /// The upstream agent that created the event.
  pub agent_id: i64,
  /// Template variables for this event.
  #[serde(default)]
  pub payload: serde_json::Value,
}

/// Payload of an event emitted by the agent.
///
/// `post_id` and `post` are only ever set together with `success = true`;
/// the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingEvent {
  success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  post_id: Option<PostId>,
  agent_id: i64,
  event_id: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  post: Option<PostResponse>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

impl OutgoingEvent {
  /// Result of a published post, correlated with the event that caused it.
  pub fn published(source: &IncomingEvent, post_id: PostId, post: PostResponse) -> Self {
    Self {
      success: true,
      post_id: Some(post_id),
      agent_id: source.agent_id,
      event_id: source.id,
      post: Some(post),
      error: None,
    }
  }

  /// Result of an event that could not be published.
  ///
  /// Even if the post was created before the failure, its id is not
  /// included here; it is reported through [`EventFailure`] instead.
  pub fn failed(source: &IncomingEvent, error: &AgentError) -> Self {
    Self {
      success: false,
      post_id: None,
      agent_id: source.agent_id,
      event_id: source.id,
      post: None,
      error: Some(error.to_string()),
    }
  }

  pub fn success(&self) -> bool {
    self.success
  }

  pub fn post_id(&self) -> Option<&str> {
    self.post_id.as_deref()
  }

  pub fn agent_id(&self) -> i64 {
    self.agent_id
  }

  pub fn event_id(&self) -> i64 {
    self.event_id
  }

  pub fn post(&self) -> Option<&PostResponse> {
    self.post.as_ref()
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// The payload as stored and passed downstream.
  pub fn to_payload(&self) -> serde_json::Value {
    serde_json::to_value(self).unwrap_or_default()
  }
}

/// An event that was skipped, and why.
#[derive(Debug)]
pub struct EventFailure {
  pub agent_id: i64,
  pub event_id: i64,
  pub error: AgentError,
}

impl EventFailure {
  pub fn new(source: &IncomingEvent, error: AgentError) -> Self {
    Self {
      agent_id: source.agent_id,
      event_id: source.id,
      error,
    }
  }

  /// Id of a post that was created even though the event failed.
  pub fn post_id(&self) -> Option<&str> {
    self.error.post_id()
  }
}

/// Outcome of one `receive` call.
#[derive(Debug, Default)]
pub struct ReceiveReport {
  /// Events emitted, in input order.
  pub emitted: Vec<OutgoingEvent>,
  /// Events that were skipped, in input order.
  pub failures: Vec<EventFailure>,
}

impl ReceiveReport {
  /// Number of posts published in this batch.
  pub fn published(&self) -> usize {
    self.emitted.iter().filter(|e| e.success()).count()
  }
}
