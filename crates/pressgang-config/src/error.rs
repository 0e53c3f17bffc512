use thiserror::Error;

/// Errors raised while loading or validating agent options.
///
/// These are fatal for the whole agent and are reported before any event
/// is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Options must be a JSON object.
  #[error("agent options must be a JSON object, got {found}")]
  NotAnObject { found: String },

  /// A required option is absent or blank.
  #[error("{option} is required")]
  MissingOption { option: String },

  /// An option is present but has an unusable value.
  #[error("invalid option '{option}': {message}")]
  InvalidOption { option: String, message: String },

  /// The remote publishing client is not available in this build or host.
  #[error("remote client is not available; the agent cannot publish")]
  RemoteClientUnavailable,

  /// Options file could not be parsed.
  #[error("failed to parse agent options: {0}")]
  Parse(#[from] serde_json::Error),
}
