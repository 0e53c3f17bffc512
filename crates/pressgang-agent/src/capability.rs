//! The capabilities an agent can offer to its host.
//!
//! An agent implements only the traits it supports. A publishing agent
//! validates options, consumes events, produces events and reports health;
//! it is never scheduled, so there is no scheduling capability here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pressgang_config::ConfigError;

use crate::event::{IncomingEvent, OutgoingEvent, ReceiveReport};
use crate::health::HealthSnapshot;

/// Checks an agent's options before it is saved or run.
pub trait ConfigValidator {
  fn validate_options(&self) -> Result<(), ConfigError>;
}

/// Handles batches of incoming events.
#[async_trait]
pub trait EventConsumer {
  /// Process events in order. A failing event never stops the batch.
  async fn receive(&self, events: &[IncomingEvent]) -> ReceiveReport;
}

/// Emits events downstream.
pub trait EventProducer {
  fn create_event(&self, event: OutgoingEvent);
}

/// Reports whether an agent is healthy.
pub trait HealthCheckable {
  fn working(&self, snapshot: &HealthSnapshot, now: DateTime<Utc>) -> bool;
}
