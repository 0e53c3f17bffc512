//! Coercion of resolved options into typed call parameters.

use pressgang_remote::ClientOptions;
use serde_json::Value;
use tracing::warn;

use crate::error::AgentError;
use crate::resolve::ResolvedParameters;

const DEFAULT_PORT: u16 = 80;
const DEFAULT_SSL_PORT: u16 = 443;
const DEFAULT_POST_STATUS: &str = "publish";
const DEFAULT_POST_AUTHOR: &str = "1";
const DEFAULT_BLOG_ID: &str = "0";
const DEFAULT_PATH: &str = "/xmlrpc.php";

const TRUE_TOKENS: &[&str] = &["true", "1", "yes", "y", "on"];
const FALSE_TOKENS: &[&str] = &["false", "0", "no", "n", "off", ""];

/// Everything one event needs for its remote calls.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishParameters {
  pub client: ClientOptions,
  /// Kept as text, exactly as resolved.
  pub blog_id: String,
  pub post_status: String,
  pub post_author: String,
  pub title: String,
  pub content: String,
  /// URL slug; empty when not configured.
  pub name: String,
  pub categories: Vec<String>,
  pub tags: Vec<String>,
  pub custom_fields: Option<Value>,
}

/// Convert resolved options into [`PublishParameters`].
pub fn coerce(resolved: &ResolvedParameters) -> Result<PublishParameters, AgentError> {
  let client = ClientOptions {
    host: text_or(resolved, "host", ""),
    port: coerce_port(resolved, "port", DEFAULT_PORT)?,
    username: text_or(resolved, "username", ""),
    password: text_or(resolved, "password", ""),
    path: non_blank_or(resolved, "path", DEFAULT_PATH),
    use_ssl: coerce_bool("use_ssl", resolved.get("use_ssl")),
    ssl_port: coerce_port(resolved, "ssl_port", DEFAULT_SSL_PORT)?,
  };

  Ok(PublishParameters {
    client,
    blog_id: text_or(resolved, "blog_id", DEFAULT_BLOG_ID),
    post_status: non_blank_or(resolved, "post_status", DEFAULT_POST_STATUS),
    post_author: non_blank_or(resolved, "post_author", DEFAULT_POST_AUTHOR),
    title: text_or(resolved, "title", ""),
    content: text_or(resolved, "content", ""),
    name: text_or(resolved, "name", ""),
    categories: split_terms(resolved.get("categories")),
    tags: split_terms(resolved.get("tags")),
    custom_fields: resolved
      .get("custom_fields")
      .filter(|v| !v.is_null())
      .cloned(),
  })
}

/// Parse a port number. Absent, `null` and blank values take `default`.
fn coerce_port(
  resolved: &ResolvedParameters,
  option: &str,
  default: u16,
) -> Result<u16, AgentError> {
  let invalid = |value: String| AgentError::TypeCoercion {
    option: option.to_string(),
    expected: "a port number",
    value,
  };

  match resolved.get(option) {
    None | Some(Value::Null) => Ok(default),
    Some(Value::Number(n)) => n
      .as_u64()
      .and_then(|n| u16::try_from(n).ok())
      .ok_or_else(|| invalid(n.to_string())),
    Some(Value::String(s)) if s.trim().is_empty() => Ok(default),
    Some(Value::String(s)) => s.trim().parse::<u16>().map_err(|_| invalid(s.clone())),
    Some(other) => Err(invalid(other.to_string())),
  }
}

/// Recognize a boolean token, ignoring case and surrounding whitespace.
///
/// Returns `None` for anything outside the known true and false tokens.
pub fn parse_bool_token(token: &str) -> Option<bool> {
  let token = token.trim().to_ascii_lowercase();
  if TRUE_TOKENS.contains(&token.as_str()) {
    Some(true)
  } else if FALSE_TOKENS.contains(&token.as_str()) {
    Some(false)
  } else {
    None
  }
}

/// Coerce a flag. Absent and unrecognized values are `false`; unrecognized
/// ones are logged so the misconfiguration is visible.
pub fn coerce_bool(option: &str, value: Option<&Value>) -> bool {
  let text = match value {
    None | Some(Value::Null) => return false,
    Some(Value::Bool(b)) => return *b,
    Some(Value::String(s)) => s.clone(),
    Some(other) => other.to_string(),
  };

  parse_bool_token(&text).unwrap_or_else(|| {
    warn!(option, value = %text, "unrecognized boolean value, treating as false");
    false
  })
}

/// Split a comma separated term list. Terms are trimmed and empty terms
/// dropped, so blank input gives an empty list.
pub fn split_terms(value: Option<&Value>) -> Vec<String> {
  match value {
    None | Some(Value::Null) => Vec::new(),
    Some(Value::String(s)) => split_csv(s),
    Some(Value::Array(items)) => items
      .iter()
      .filter_map(|item| match item {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
      })
      .filter(|term| !term.is_empty())
      .collect(),
    Some(other) => split_csv(&other.to_string()),
  }
}

fn split_csv(s: &str) -> Vec<String> {
  s.split(',')
    .map(str::trim)
    .filter(|term| !term.is_empty())
    .map(String::from)
    .collect()
}

fn text_or(resolved: &ResolvedParameters, option: &str, default: &str) -> String {
  resolved
    .text(option)
    .unwrap_or_else(|| default.to_string())
}

fn non_blank_or(resolved: &ResolvedParameters, option: &str, default: &str) -> String {
  resolved
    .text(option)
    .filter(|s| !s.trim().is_empty())
    .unwrap_or_else(|| default.to_string())
}
