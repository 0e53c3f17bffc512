use async_trait::async_trait;

use crate::error::RemoteCallError;
use crate::types::{ClientOptions, PostId, PostRequest, PostResponse};

/// Remote capability for creating and fetching posts.
///
/// Implementations must not keep sessions between calls: each call connects
/// using the given [`ClientOptions`] and runs to completion or failure. Retry
/// policy, if any, does not belong here either.
#[async_trait]
pub trait RemoteClient: Send + Sync {
  /// Create a post and return the id the server assigned to it.
  async fn create_post(
    &self,
    options: &ClientOptions,
    request: &PostRequest,
  ) -> Result<PostId, RemoteCallError>;

  /// Fetch the full stored representation of a post.
  async fn get_post(
    &self,
    options: &ClientOptions,
    post_id: &str,
  ) -> Result<PostResponse, RemoteCallError>;
}

#[async_trait]
impl<'a, T: RemoteClient + ?Sized> RemoteClient for &'a T {
  async fn create_post(
    &self,
    options: &ClientOptions,
    request: &PostRequest,
  ) -> Result<PostId, RemoteCallError> {
    (**self).create_post(options, request).await
  }

  async fn get_post(
    &self,
    options: &ClientOptions,
    post_id: &str,
  ) -> Result<PostResponse, RemoteCallError> {
    (**self).get_post(options, post_id).await
  }
}
