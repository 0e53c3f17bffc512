//! Pressgang Remote
//!
//! The remote publishing capability used by the agent. The core only sees the
//! [`RemoteClient`] trait: one call creates a post and returns its id, a
//! second call fetches the stored post back.
//!
//! [`XmlRpcClient`] implements the trait against the WordPress XML-RPC API
//! (`wp.newPost` / `wp.getPost`). Every call opens its own HTTP client; nothing
//! is cached between calls, including between the create and the fetch of the
//! same post.

mod client;
mod error;
mod types;
mod xmlrpc;

pub use client::RemoteClient;
pub use error::RemoteCallError;
pub use types::{ClientOptions, PostContent, PostId, PostRequest, PostResponse, TermsNames};
pub use xmlrpc::{XmlRpcClient, XmlRpcValue, decode_method_response, encode_method_call};
