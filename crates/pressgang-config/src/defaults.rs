use serde_json::{Map, Value, json};

use crate::options::AgentOptions;

/// Values applied for every option the instance configuration leaves out.
///
/// `port`, `use_ssl` and `ssl_port` are literals; they still go through
/// coercion so a configured `"8080"` and a default `80` are handled alike.
pub fn default_options() -> AgentOptions {
  AgentOptions::from_map(object(json!({
    "message": "{{text}}",
    "path": "/xmlrpc.php",
    "blog_id": "0",
    "post_status": "publish",
    "post_author": "1",
    "port": 80,
    "use_ssl": false,
    "ssl_port": 443,
  })))
}

/// Starting point for a new agent instance.
///
/// Unlike [`default_options`] this includes placeholders for the required
/// options, so it is meant to be edited and saved, never merged.
pub fn scaffold_options() -> AgentOptions {
  let mut map = default_options().into_map();
  let scaffold = object(json!({
    "expected_update_period_in_days": "10",
    "host": "example.com",
    "username": "",
    "password": "",
    "title": "{{title}}",
    "content": "{{content}}",
    "categories": "",
    "tags": "",
  }));
  map.extend(scaffold);
  AgentOptions::from_map(map)
}

fn object(value: Value) -> Map<String, Value> {
  match value {
    Value::Object(map) => map,
    _ => Map::new(),
  }
}
