//! Pressgang Agent
//!
//! Turns incoming events into published posts. For every event the agent:
//!
//! 1. renders its options against the event payload ([`resolve`])
//! 2. converts the rendered text into typed call parameters ([`coerce`])
//! 3. builds the "create post" request ([`build_post_request`])
//! 4. creates the post, then fetches it back through a [`RemoteClient`]
//! 5. emits an [`OutgoingEvent`] carrying the post and the source event's ids
//!
//! Events are processed one at a time, in order. An event that fails at any
//! step is skipped and reported in the [`ReceiveReport`]; the rest of the
//! batch still runs.
//!
//! Health is evaluated separately from a [`HealthSnapshot`] of the agent's
//! history ([`evaluate`]).
//!
//! [`RemoteClient`]: pressgang_remote::RemoteClient

mod agent;
mod capability;
mod coerce;
mod error;
mod event;
mod health;
mod request;
mod resolve;
mod sink;

pub use agent::WordpressAgent;
pub use capability::{ConfigValidator, EventConsumer, EventProducer, HealthCheckable};
pub use coerce::{PublishParameters, coerce, coerce_bool, parse_bool_token, split_terms};
pub use error::{AgentError, RemoteStep};
pub use event::{EventFailure, IncomingEvent, OutgoingEvent, ReceiveReport};
pub use health::{HealthSnapshot, evaluate};
pub use request::{build_post_request, build_post_request_at};
pub use resolve::{ResolvedParameters, TEMPLATED_OPTIONS, resolve};
pub use sink::{ChannelSink, EventSink, NoopSink};
