//! XML-RPC implementation of [`RemoteClient`](crate::RemoteClient).
//!
//! # Wire format
//! A call is a `methodCall` document posted as `text/xml`:
//! ```xml
//! <?xml version="1.0"?>
//! <methodCall>
//!   <methodName>wp.newPost</methodName>
//!   <params>
//!     <param><value><string>0</string></value></param>
//!     ...
//!   </params>
//! </methodCall>
//! ```
//! The answer is either `params` with a single value or a `fault` struct
//! carrying `faultCode` and `faultString`.

mod client;
mod decode;
mod value;

pub use client::XmlRpcClient;
pub use decode::decode_method_response;
pub use value::{XmlRpcValue, encode_method_call};
