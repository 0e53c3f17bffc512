//! Building the "create post" request.

use chrono::{DateTime, Utc};
use pressgang_remote::{PostContent, PostRequest, TermsNames};

use crate::coerce::PublishParameters;

/// Build the request, dated now.
pub fn build_post_request(params: &PublishParameters) -> PostRequest {
  build_post_request_at(params, Utc::now())
}

/// Build the request with an explicit `post_date`.
pub fn build_post_request_at(params: &PublishParameters, now: DateTime<Utc>) -> PostRequest {
  PostRequest {
    blog_id: params.blog_id.clone(),
    content: PostContent {
      post_status: params.post_status.clone(),
      post_date: now,
      post_content: params.content.clone(),
      post_title: params.title.clone(),
      post_name: params.name.clone(),
      post_author: params.post_author.clone(),
      terms_names: TermsNames {
        category: params.categories.clone(),
        post_tag: params.tags.clone(),
      },
      custom_fields: params.custom_fields.clone(),
    },
  }
}
