//! Destinations for emitted events.
//!
//! The agent hands every event it creates to an [`EventSink`]. The host
//! decides what happens next: persist it, forward it downstream, or drop it.

use tokio::sync::mpsc;

use crate::event::OutgoingEvent;

/// Receives events emitted by an agent.
pub trait EventSink: Send + Sync {
  fn emit(&self, event: OutgoingEvent);
}

/// A sink that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
  fn emit(&self, _event: OutgoingEvent) {}
}

/// A sink that forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
  sender: mpsc::UnboundedSender<OutgoingEvent>,
}

impl ChannelSink {
  pub fn new(sender: mpsc::UnboundedSender<OutgoingEvent>) -> Self {
    Self { sender }
  }
}

impl EventSink for ChannelSink {
  fn emit(&self, event: OutgoingEvent) {
    // receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
