//! Per-event error types.

use std::fmt;

use pressgang_remote::{PostId, RemoteCallError};

/// Which of the two remote calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStep {
  CreatePost,
  GetPost,
}

impl fmt::Display for RemoteStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::CreatePost => f.write_str("createPost"),
      Self::GetPost => f.write_str("getPost"),
    }
  }
}

/// Errors that fail a single event.
///
/// None of these stop a batch: the event is skipped, the error is reported,
/// and the next event is processed.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
  /// A template could not be rendered (bad syntax or undefined variable).
  #[error("failed to resolve option '{option}': {message}")]
  TemplateResolution { option: String, message: String },

  /// A resolved value could not be converted to the type the call needs.
  #[error("option '{option}' expected {expected}, got '{value}'")]
  TypeCoercion {
    option: String,
    expected: &'static str,
    value: String,
  },

  /// A remote call failed. When the post was already created, `post_id`
  /// holds its id.
  #[error("remote call {step} failed: {source}")]
  RemoteCall {
    step: RemoteStep,
    post_id: Option<PostId>,
    #[source]
    source: RemoteCallError,
  },

  /// The agent was built without a remote client.
  #[error("no remote client is available")]
  RemoteClientUnavailable,
}

impl AgentError {
  /// Id of a post that exists on the server despite the failure.
  pub fn post_id(&self) -> Option<&str> {
    match self {
      Self::RemoteCall { post_id, .. } => post_id.as_deref(),
      _ => None,
    }
  }
}
