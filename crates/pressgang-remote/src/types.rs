use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RemoteCallError;

/// Identifier the remote server assigns to a created post.
pub type PostId = String;

/// The stored post as returned by the server. Its fields are defined by the
/// remote API, so it is kept as an opaque JSON value.
pub type PostResponse = serde_json::Value;

/// Connection parameters for one remote call.
///
/// Built fresh for every event and never shared between events.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
  pub host: String,
  pub port: u16,
  pub username: String,
  pub password: String,
  pub path: String,
  pub use_ssl: bool,
  pub ssl_port: u16,
}

impl ClientOptions {
  /// The URL calls are posted to.
  ///
  /// With `use_ssl` the scheme is https and `ssl_port` replaces `port`.
  pub fn endpoint(&self) -> Result<Url, RemoteCallError> {
    let (scheme, port) = if self.use_ssl {
      ("https", self.ssl_port)
    } else {
      ("http", self.port)
    };

    let base = format!("{}://{}:{}", scheme, self.host, port);
    let mut url = Url::parse(&base).map_err(|e| RemoteCallError::InvalidEndpoint {
      endpoint: base.clone(),
      message: e.to_string(),
    })?;

    if !self.path.is_empty() {
      url.set_path(&self.path);
    }

    Ok(url)
  }
}

// Hand-written so credentials never end up in logs.
impl fmt::Debug for ClientOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ClientOptions")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .field("path", &self.path)
      .field("use_ssl", &self.use_ssl)
      .field("ssl_port", &self.ssl_port)
      .finish()
  }
}

/// Payload of the "create post" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRequest {
  /// Target blog in multi-site deployments. Kept as text, exactly as given.
  pub blog_id: String,
  pub content: PostContent,
}

/// The post itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostContent {
  pub post_status: String,
  /// When the request was built, not when the source event was created.
  pub post_date: DateTime<Utc>,
  pub post_content: String,
  pub post_title: String,
  pub post_name: String,
  pub post_author: String,
  pub terms_names: TermsNames,
  /// Passed to the server untouched; `None` leaves the member out.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub custom_fields: Option<serde_json::Value>,
}

/// Taxonomy terms by taxonomy name. Both lists are always present, possibly
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsNames {
  pub category: Vec<String>,
  pub post_tag: Vec<String>,
}
