//! The publishing agent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pressgang_config::{AgentOptions, ConfigError};
use pressgang_remote::RemoteClient;
use tracing::{debug, error, info, instrument, warn};

use crate::capability::{ConfigValidator, EventConsumer, EventProducer, HealthCheckable};
use crate::coerce::{coerce, coerce_bool};
use crate::error::{AgentError, RemoteStep};
use crate::event::{EventFailure, IncomingEvent, OutgoingEvent, ReceiveReport};
use crate::health::{HealthSnapshot, evaluate};
use crate::request::build_post_request;
use crate::resolve::resolve;
use crate::sink::EventSink;

/// Publishes one post per incoming event and emits the result.
///
/// The remote client is fixed at construction. An agent built without one
/// fails validation and skips every event it receives.
pub struct WordpressAgent<C, S> {
  id: i64,
  options: AgentOptions,
  client: Option<C>,
  sink: S,
  emit_failure_events: bool,
}

impl<C, S> WordpressAgent<C, S>
where
  C: RemoteClient,
  S: EventSink,
{
  /// Create an agent. `options` are layered over the defaults; call
  /// [`ConfigValidator::validate_options`] before running it.
  pub fn new(id: i64, options: AgentOptions, client: Option<C>, sink: S) -> Self {
    let options = options.with_defaults();
    let emit_failure_events = coerce_bool("emit_failure_events", options.get("emit_failure_events"));

    Self {
      id,
      options,
      client,
      sink,
      emit_failure_events,
    }
  }

  pub fn id(&self) -> i64 {
    self.id
  }

  /// Options with defaults applied.
  pub fn options(&self) -> &AgentOptions {
    &self.options
  }

  pub fn remote_client_available(&self) -> bool {
    self.client.is_some()
  }

  /// Create the post for one event and fetch it back.
  #[instrument(
    name = "publish_event",
    skip(self, client, event),
    fields(agent_id = self.id, event_id = event.id, source_agent_id = event.agent_id)
  )]
  async fn process(&self, client: &C, event: &IncomingEvent) -> Result<OutgoingEvent, AgentError> {
    let resolved = resolve(&self.options, event)?;
    let params = coerce(&resolved)?;
    let request = build_post_request(&params);

    debug!(
      host = %params.client.host,
      blog_id = %request.blog_id,
      title = %request.content.post_title,
      categories = ?request.content.terms_names.category,
      tags = ?request.content.terms_names.post_tag,
      "creating post"
    );

    let post_id = client
      .create_post(&params.client, &request)
      .await
      .map_err(|source| AgentError::RemoteCall {
        step: RemoteStep::CreatePost,
        post_id: None,
        source,
      })?;

    let post = client
      .get_post(&params.client, &post_id)
      .await
      .map_err(|source| AgentError::RemoteCall {
        step: RemoteStep::GetPost,
        post_id: Some(post_id.clone()),
        source,
      })?;

    info!(post_id = %post_id, "post published");
    Ok(OutgoingEvent::published(event, post_id, post))
  }

  fn fail(&self, report: &mut ReceiveReport, event: &IncomingEvent, error: AgentError) {
    match error.post_id() {
      Some(post_id) => error!(
        agent_id = self.id,
        event_id = event.id,
        post_id,
        error = %error,
        "event failed after post was created"
      ),
      None => error!(agent_id = self.id, event_id = event.id, error = %error, "event failed"),
    }

    if self.emit_failure_events {
      let failed = OutgoingEvent::failed(event, &error);
      self.create_event(failed.clone());
      report.emitted.push(failed);
    }
    report.failures.push(EventFailure::new(event, error));
  }
}

impl<C, S> ConfigValidator for WordpressAgent<C, S> {
  fn validate_options(&self) -> Result<(), ConfigError> {
    if self.client.is_none() {
      return Err(ConfigError::RemoteClientUnavailable);
    }
    self.options.validate()
  }
}

#[async_trait]
impl<C, S> EventConsumer for WordpressAgent<C, S>
where
  C: RemoteClient,
  S: EventSink,
{
  #[instrument(name = "receive", skip(self, events), fields(agent_id = self.id, events = events.len()))]
  async fn receive(&self, events: &[IncomingEvent]) -> ReceiveReport {
    let mut report = ReceiveReport::default();

    let Some(client) = self.client.as_ref() else {
      warn!(agent_id = self.id, "remote client unavailable, skipping batch");
      for event in events {
        self.fail(&mut report, event, AgentError::RemoteClientUnavailable);
      }
      return report;
    };

    for event in events {
      match self.process(client, event).await {
        Ok(published) => {
          self.create_event(published.clone());
          report.emitted.push(published);
        }
        Err(e) => self.fail(&mut report, event, e),
      }
    }

    info!(
      agent_id = self.id,
      published = report.published(),
      failed = report.failures.len(),
      "batch processed"
    );
    report
  }
}

impl<C, S> EventProducer for WordpressAgent<C, S>
where
  S: EventSink,
{
  fn create_event(&self, event: OutgoingEvent) {
    self.sink.emit(event);
  }
}

impl<C, S> HealthCheckable for WordpressAgent<C, S> {
  fn working(&self, snapshot: &HealthSnapshot, now: DateTime<Utc>) -> bool {
    match self.options.expected_update_period_in_days() {
      Ok(days) => evaluate(snapshot, days, now),
      Err(e) => {
        warn!(agent_id = self.id, error = %e, "cannot evaluate health");
        false
      }
    }
  }
}
