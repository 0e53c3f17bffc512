use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, instrument};

use super::decode::decode_method_response;
use super::value::{XmlRpcValue, encode_method_call};
use crate::client::RemoteClient;
use crate::error::RemoteCallError;
use crate::types::{ClientOptions, PostId, PostRequest, PostResponse};

/// Blog id sent with `wp.getPost`. WordPress resolves the blog from the
/// endpoint, so the value only has to be well formed.
const GET_POST_BLOG_ID: &str = "0";

/// [`RemoteClient`] speaking the WordPress XML-RPC API.
#[derive(Debug, Clone, Default)]
pub struct XmlRpcClient {
  timeout: Option<Duration>,
}

impl XmlRpcClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Abort calls that take longer than `timeout`. Without one, a call waits
  /// as long as the transport does.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  /// Perform one XML-RPC call on a freshly built HTTP client.
  #[instrument(name = "xmlrpc_call", skip(self, options, params), fields(host = %options.host))]
  async fn call(
    &self,
    options: &ClientOptions,
    method: &str,
    params: &[XmlRpcValue],
  ) -> Result<Value, RemoteCallError> {
    let url = options.endpoint()?;

    let mut builder = Client::builder();
    if let Some(timeout) = self.timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    debug!(%url, "sending request");

    let response = client
      .post(url)
      .header(CONTENT_TYPE, "text/xml")
      .body(encode_method_call(method, params))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(RemoteCallError::Status {
        status: status.as_u16(),
      });
    }

    let body = response.text().await?;
    decode_method_response(&body)
  }

  fn credentials(blog_id: &str, options: &ClientOptions) -> Vec<XmlRpcValue> {
    vec![
      blog_id.into(),
      options.username.as_str().into(),
      options.password.as_str().into(),
    ]
  }
}

#[async_trait]
impl RemoteClient for XmlRpcClient {
  async fn create_post(
    &self,
    options: &ClientOptions,
    request: &PostRequest,
  ) -> Result<PostId, RemoteCallError> {
    let mut params = Self::credentials(&request.blog_id, options);
    params.push((&request.content).into());

    debug!(
      post_title = %request.content.post_title,
      post_status = %request.content.post_status,
      "creating post"
    );

    match self.call(options, "wp.newPost", &params).await? {
      Value::String(id) => Ok(id),
      Value::Number(id) => Ok(id.to_string()),
      other => Err(RemoteCallError::Protocol {
        message: format!("expected a post id, got {}", other),
      }),
    }
  }

  async fn get_post(
    &self,
    options: &ClientOptions,
    post_id: &str,
  ) -> Result<PostResponse, RemoteCallError> {
    let mut params = Self::credentials(GET_POST_BLOG_ID, options);
    params.push(post_id.into());

    debug!(%post_id, "fetching post");

    self.call(options, "wp.getPost", &params).await
  }
}
