//! Option resolution using minijinja templates.
//!
//! Renders the publishing options of an agent against one incoming event.
//! String options are templates; arrays and objects are walked and their
//! strings rendered too. Everything else passes through untouched.
//!
//! # Context
//! The event payload is the template context, so `{{ title }}` reads the
//! payload's `title`. Options can also refer to each other through the
//! `options` namespace:
//! ```json
//! { "title": "{{ headline | title }}", "name": "{{ options.title | lower }}" }
//! ```
//!
//! # Cross-references
//! Each pass renders the original templates with `options` bound to the
//! previous pass's output, until a pass changes nothing. Chains settle after
//! as many passes as they are long; cycles never settle and are reported.

use minijinja::{Environment, UndefinedBehavior, Value};
use pressgang_config::AgentOptions;
use serde_json::Map;

use crate::error::AgentError;
use crate::event::IncomingEvent;

/// Options rendered per event. All others are carried as configured.
pub const TEMPLATED_OPTIONS: &[&str] = &[
  "host",
  "port",
  "username",
  "password",
  "path",
  "use_ssl",
  "ssl_port",
  "post_status",
  "title",
  "content",
  "name",
  "post_author",
  "categories",
  "tags",
  "blog_id",
  "custom_fields",
];

/// Options after template rendering, still in text form.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameters(Map<String, serde_json::Value>);

impl ResolvedParameters {
  pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
    self.0.get(key)
  }

  /// The value as text: strings as-is, numbers and booleans formatted,
  /// arrays and objects as JSON. `null` and absent keys are `None`.
  pub fn text(&self, key: &str) -> Option<String> {
    match self.0.get(key)? {
      serde_json::Value::Null => None,
      serde_json::Value::String(s) => Some(s.clone()),
      other => Some(other.to_string()),
    }
  }

  pub fn into_map(self) -> Map<String, serde_json::Value> {
    self.0
  }
}

/// Resolve an agent's options against one event.
///
/// `options` should already carry defaults. Neither argument is modified.
pub fn resolve(
  options: &AgentOptions,
  event: &IncomingEvent,
) -> Result<ResolvedParameters, AgentError> {
  let mut env = Environment::new();
  env.set_undefined_behavior(UndefinedBehavior::Strict);

  let payload = payload_context(&event.payload);
  let max_passes = options.as_map().len() + 1;
  let mut current = options.as_map().clone();

  for _ in 0..max_passes {
    let ctx = context(&payload, &current);
    let mut next = options.as_map().clone();

    for key in TEMPLATED_OPTIONS {
      if let Some(template) = options.get(key) {
        let rendered = render_value(&env, key, template, &ctx)?;
        next.insert(key.to_string(), rendered);
      }
    }

    if next == current {
      return Ok(ResolvedParameters(next));
    }
    current = next;
  }

  Err(AgentError::TemplateResolution {
    option: "options".to_string(),
    message: format!(
      "options reference each other in a cycle (no stable result after {} passes)",
      max_passes
    ),
  })
}

fn payload_context(payload: &serde_json::Value) -> Map<String, serde_json::Value> {
  match payload {
    serde_json::Value::Object(map) => map.clone(),
    serde_json::Value::Null => Map::new(),
    other => {
      let mut map = Map::new();
      map.insert("payload".to_string(), other.clone());
      map
    }
  }
}

fn context(
  payload: &Map<String, serde_json::Value>,
  options: &Map<String, serde_json::Value>,
) -> Value {
  let mut ctx = payload.clone();
  ctx.insert(
    "options".to_string(),
    serde_json::Value::Object(options.clone()),
  );
  Value::from_serialize(&ctx)
}

fn render_value(
  env: &Environment,
  option: &str,
  value: &serde_json::Value,
  ctx: &Value,
) -> Result<serde_json::Value, AgentError> {
  match value {
    serde_json::Value::String(template) => {
      render_template(env, option, template, ctx).map(serde_json::Value::String)
    }
    serde_json::Value::Array(items) => items
      .iter()
      .map(|item| render_value(env, option, item, ctx))
      .collect::<Result<Vec<_>, _>>()
      .map(serde_json::Value::Array),
    serde_json::Value::Object(map) => {
      let mut rendered = Map::new();
      for (k, v) in map {
        rendered.insert(k.clone(), render_value(env, option, v, ctx)?);
      }
      Ok(serde_json::Value::Object(rendered))
    }
    other => Ok(other.clone()),
  }
}

fn render_template(
  env: &Environment,
  option: &str,
  template: &str,
  ctx: &Value,
) -> Result<String, AgentError> {
  env
    .render_str(template, ctx.clone())
    .map_err(|e| AgentError::TemplateResolution {
      option: option.to_string(),
      message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn options(value: serde_json::Value) -> AgentOptions {
    AgentOptions::try_from(value).unwrap().with_defaults()
  }

  fn event(payload: serde_json::Value) -> IncomingEvent {
    IncomingEvent {
      id: 1,
      agent_id: 2,
      payload,
    }
  }

  #[test]
  fn test_resolve_from_payload() {
    let opts = options(json!({
      "title": "{{title}}",
      "content": "{{ body }}",
      "name": "{{ title | lower }}"
    }));

    let resolved = resolve(&opts, &event(json!({"title": "Hello", "body": "World"}))).unwrap();

    assert_eq!(resolved.text("title").unwrap(), "Hello");
    assert_eq!(resolved.text("content").unwrap(), "World");
    assert_eq!(resolved.text("name").unwrap(), "hello");
  }

  #[test]
  fn test_defaults_resolved() {
    let resolved = resolve(&options(json!({})), &event(json!({}))).unwrap();

    assert_eq!(resolved.text("port").unwrap(), "80");
    assert_eq!(resolved.text("path").unwrap(), "/xmlrpc.php");
    assert_eq!(resolved.text("blog_id").unwrap(), "0");
    assert_eq!(resolved.text("post_status").unwrap(), "publish");
    assert_eq!(resolved.text("post_author").unwrap(), "1");
    assert_eq!(resolved.text("use_ssl").unwrap(), "false");
    assert_eq!(resolved.text("ssl_port").unwrap(), "443");
  }

  #[test]
  fn test_untemplated_options_not_rendered() {
    // `message` defaults to "{{text}}"; events without `text` must still work.
    let resolved = resolve(&options(json!({"title": "static"})), &event(json!({}))).unwrap();

    assert_eq!(resolved.text("message").unwrap(), "{{text}}");
    assert_eq!(resolved.text("title").unwrap(), "static");
  }

  #[test]
  fn test_cross_reference() {
    let opts = options(json!({
      "title": "{{ headline }}",
      "content": "<p>{{ options.title }}</p>",
      "name": "{{ options.title | lower | replace(' ', '-') }}"
    }));

    let resolved = resolve(&opts, &event(json!({"headline": "Big News"}))).unwrap();

    assert_eq!(resolved.text("content").unwrap(), "<p>Big News</p>");
    assert_eq!(resolved.text("name").unwrap(), "big-news");
  }

  #[test]
  fn test_chained_cross_reference() {
    let opts = options(json!({
      "title": "{{ options.content }}!",
      "content": "{{ options.name }}?",
      "name": "{{ slug }}"
    }));

    let resolved = resolve(&opts, &event(json!({"slug": "x"}))).unwrap();

    assert_eq!(resolved.text("name").unwrap(), "x");
    assert_eq!(resolved.text("content").unwrap(), "x?");
    assert_eq!(resolved.text("title").unwrap(), "x?!");
  }

  #[test]
  fn test_cycle_is_error() {
    let opts = options(json!({
      "title": "{{ options.content }}a",
      "content": "{{ options.title }}b"
    }));

    let err = resolve(&opts, &event(json!({}))).unwrap_err();
    assert!(matches!(err, AgentError::TemplateResolution { ref option, .. } if option == "options"));
  }

  #[test]
  fn test_undefined_variable_is_error() {
    let opts = options(json!({"title": "{{ missing }}"}));

    let err = resolve(&opts, &event(json!({"title": "x"}))).unwrap_err();
    assert!(matches!(err, AgentError::TemplateResolution { ref option, .. } if option == "title"));
  }

  #[test]
  fn test_defined_test_covers_missing_variable() {
    let opts = options(json!({"tags": "{% if tags is defined %}{{ tags }}{% endif %}"}));

    let resolved = resolve(&opts, &event(json!({}))).unwrap();
    assert_eq!(resolved.text("tags").unwrap(), "");
  }

  #[test]
  fn test_malformed_template_is_error() {
    let opts = options(json!({"content": "{{ body "}));

    let err = resolve(&opts, &event(json!({"body": "x"}))).unwrap_err();
    assert!(matches!(err, AgentError::TemplateResolution { ref option, .. } if option == "content"));
  }

  #[test]
  fn test_custom_fields_rendered_recursively() {
    let opts = options(json!({
      "custom_fields": [
        {"key": "source_url", "value": "{{ url }}"},
        {"key": "score", "value": 5}
      ]
    }));

    let resolved = resolve(&opts, &event(json!({"url": "https://example.org/a"}))).unwrap();

    assert_eq!(
      resolved.get("custom_fields").unwrap(),
      &json!([
        {"key": "source_url", "value": "https://example.org/a"},
        {"key": "score", "value": 5}
      ])
    );
  }

  #[test]
  fn test_options_not_mutated() {
    let opts = options(json!({"title": "{{ title }}"}));
    let before = opts.clone();

    resolve(&opts, &event(json!({"title": "Hello"}))).unwrap();

    assert_eq!(opts, before);
  }

  #[test]
  fn test_non_object_payload() {
    let opts = options(json!({"content": "{{ payload }}"}));

    let resolved = resolve(&opts, &event(json!("plain text"))).unwrap();
    assert_eq!(resolved.text("content").unwrap(), "plain text");
  }

  #[test]
  fn test_numeric_payload_value() {
    let opts = options(json!({"port": "{{ port }}"}));

    let resolved = resolve(&opts, &event(json!({"port": 8080}))).unwrap();
    assert_eq!(resolved.text("port").unwrap(), "8080");
  }
}
