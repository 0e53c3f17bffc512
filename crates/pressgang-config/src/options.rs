use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::default_options;
use crate::error::ConfigError;

/// Options that must be present and non-blank for an agent to be saved.
pub const REQUIRED_OPTIONS: &[&str] = &[
  "expected_update_period_in_days",
  "host",
  "username",
  "password",
  "title",
  "content",
];

/// Options for one agent instance, keyed by option name.
///
/// The map is never mutated once loaded; per-event resolution works on a
/// rendered copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentOptions(Map<String, Value>);

impl AgentOptions {
  pub fn from_map(map: Map<String, Value>) -> Self {
    Self(map)
  }

  /// Parse options from a JSON document.
  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    let value: Value = serde_json::from_str(json)?;
    Self::try_from(value)
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
    self.0.iter()
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.0
  }

  pub fn into_map(self) -> Map<String, Value> {
    self.0
  }

  /// Layer these options over [`default_options`].
  ///
  /// Configured values always win, including explicit `null`s.
  pub fn with_defaults(&self) -> Self {
    let mut merged = default_options().into_map();
    for (key, value) in &self.0 {
      merged.insert(key.clone(), value.clone());
    }
    Self(merged)
  }

  /// Check that every required option is present and usable.
  ///
  /// An option counts as missing when it is absent, `null`, or a string
  /// containing only whitespace.
  pub fn validate(&self) -> Result<(), ConfigError> {
    for option in REQUIRED_OPTIONS {
      if !self.is_present(option) {
        return Err(ConfigError::MissingOption {
          option: option.to_string(),
        });
      }
    }

    self.expected_update_period_in_days()?;
    Ok(())
  }

  /// The health-check window, in whole days.
  pub fn expected_update_period_in_days(&self) -> Result<u32, ConfigError> {
    const KEY: &str = "expected_update_period_in_days";

    let invalid = |message: String| ConfigError::InvalidOption {
      option: KEY.to_string(),
      message,
    };

    let days = match self.0.get(KEY) {
      None | Some(Value::Null) => {
        return Err(ConfigError::MissingOption {
          option: KEY.to_string(),
        });
      }
      Some(Value::Number(n)) => n
        .as_u64()
        .ok_or_else(|| invalid(format!("expected a whole number of days, got {}", n)))?,
      Some(Value::String(s)) => s
        .trim()
        .parse::<u64>()
        .map_err(|_| invalid(format!("expected a whole number of days, got '{}'", s)))?,
      Some(other) => {
        return Err(invalid(format!(
          "expected a whole number of days, got {}",
          other
        )));
      }
    };

    if days == 0 {
      return Err(invalid("must be at least 1 day".to_string()));
    }

    u32::try_from(days).map_err(|_| invalid(format!("{} days is out of range", days)))
  }

  fn is_present(&self, key: &str) -> bool {
    match self.0.get(key) {
      None | Some(Value::Null) => false,
      Some(Value::String(s)) => !s.trim().is_empty(),
      Some(_) => true,
    }
  }
}

impl TryFrom<Value> for AgentOptions {
  type Error = ConfigError;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    match value {
      Value::Object(map) => Ok(Self(map)),
      other => Err(ConfigError::NotAnObject {
        found: kind_of(&other).to_string(),
      }),
    }
  }
}

fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn complete() -> AgentOptions {
    AgentOptions::try_from(json!({
      "host": "example.com",
      "username": "u",
      "password": "p",
      "title": "{{title}}",
      "content": "{{body}}",
      "expected_update_period_in_days": "5"
    }))
    .unwrap()
  }

  #[test]
  fn test_validate_complete_options() {
    assert!(complete().validate().is_ok());
  }

  #[test]
  fn test_missing_update_period() {
    let mut map = complete().into_map();
    map.remove("expected_update_period_in_days");

    let err = AgentOptions::from_map(map).validate().unwrap_err();
    assert!(matches!(
      err,
      ConfigError::MissingOption { ref option } if option == "expected_update_period_in_days"
    ));
    assert_eq!(err.to_string(), "expected_update_period_in_days is required");
  }

  #[test]
  fn test_blank_host_is_missing() {
    let mut map = complete().into_map();
    map.insert("host".to_string(), json!("   "));

    let err = AgentOptions::from_map(map).validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingOption { ref option } if option == "host"));
  }

  #[test]
  fn test_null_password_is_missing() {
    let mut map = complete().into_map();
    map.insert("password".to_string(), Value::Null);

    let err = AgentOptions::from_map(map).validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingOption { ref option } if option == "password"));
  }

  #[test]
  fn test_update_period_accepts_number() {
    let mut map = complete().into_map();
    map.insert("expected_update_period_in_days".to_string(), json!(3));

    let options = AgentOptions::from_map(map);
    assert_eq!(options.expected_update_period_in_days().unwrap(), 3);
  }

  #[test]
  fn test_update_period_rejects_text() {
    let mut map = complete().into_map();
    map.insert("expected_update_period_in_days".to_string(), json!("soon"));

    let err = AgentOptions::from_map(map).validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOption { .. }));
  }

  #[test]
  fn test_update_period_rejects_zero() {
    let mut map = complete().into_map();
    map.insert("expected_update_period_in_days".to_string(), json!("0"));

    assert!(AgentOptions::from_map(map).validate().is_err());
  }

  #[test]
  fn test_with_defaults_keeps_configured_values() {
    let mut map = complete().into_map();
    map.insert("port".to_string(), json!("8080"));

    let merged = AgentOptions::from_map(map).with_defaults();
    assert_eq!(merged.get("port"), Some(&json!("8080")));
    assert_eq!(merged.get("path"), Some(&json!("/xmlrpc.php")));
    assert_eq!(merged.get("title"), Some(&json!("{{title}}")));
  }

  #[test]
  fn test_with_defaults_does_not_mutate_original() {
    let options = complete();
    let _ = options.with_defaults();
    assert!(options.get("path").is_none());
  }

  #[test]
  fn test_non_object_rejected() {
    let err = AgentOptions::try_from(json!(["host"])).unwrap_err();
    assert!(matches!(err, ConfigError::NotAnObject { .. }));
  }

  #[test]
  fn test_from_json() {
    let options = AgentOptions::from_json(r#"{"host": "example.com"}"#).unwrap();
    assert_eq!(options.get("host"), Some(&json!("example.com")));

    assert!(matches!(
      AgentOptions::from_json("{not json"),
      Err(ConfigError::Parse(_))
    ));
  }
}
