use thiserror::Error;

/// Any failure of a remote call.
///
/// The agent treats every variant the same way; the variants exist so the
/// error log says what actually went wrong.
#[derive(Debug, Error)]
pub enum RemoteCallError {
  /// Connection options do not form a usable URL.
  #[error("invalid endpoint '{endpoint}': {message}")]
  InvalidEndpoint { endpoint: String, message: String },

  /// Connecting, sending or reading the response failed.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The server answered with a non-success HTTP status.
  #[error("server returned HTTP {status}")]
  Status { status: u16 },

  /// The server answered with an XML-RPC fault (bad credentials, unknown
  /// blog, permission denied, ...).
  #[error("remote fault {code}: {message}")]
  Fault { code: i64, message: String },

  /// The response could not be understood.
  #[error("malformed response: {message}")]
  Protocol { message: String },
}
