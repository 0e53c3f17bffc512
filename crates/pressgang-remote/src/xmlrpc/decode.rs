use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::{Map, Value};

use crate::error::RemoteCallError;

/// Minimal element tree built from the response document.
#[derive(Debug, Default)]
struct Node {
  name: String,
  text: String,
  children: Vec<Node>,
}

impl Node {
  fn named(name: String) -> Self {
    Self {
      name,
      ..Self::default()
    }
  }

  fn child(&self, name: &str) -> Option<&Node> {
    self.children.iter().find(|c| c.name == name)
  }

  fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> {
    self.children.iter().filter(move |c| c.name == name)
  }
}

/// Decode a `methodResponse` document into the returned value.
///
/// A `fault` response becomes [`RemoteCallError::Fault`]. XML-RPC scalars map
/// onto JSON; `dateTime.iso8601` and `base64` stay as text.
pub fn decode_method_response(xml: &str) -> Result<Value, RemoteCallError> {
  let root = parse_document(xml)?;

  if root.name != "methodResponse" {
    return Err(protocol(format!(
      "expected methodResponse, got <{}>",
      root.name
    )));
  }

  if let Some(fault) = root.child("fault") {
    let value = fault
      .child("value")
      .ok_or_else(|| protocol("fault without a value"))?;
    return Err(fault_error(&decode_value(value)?));
  }

  let value = root
    .child("params")
    .and_then(|p| p.child("param"))
    .and_then(|p| p.child("value"))
    .ok_or_else(|| protocol("response has no return value"))?;

  decode_value(value)
}

fn parse_document(xml: &str) -> Result<Node, RemoteCallError> {
  let mut reader = Reader::from_str(xml);
  let mut stack = vec![Node::default()];

  loop {
    let event = reader
      .read_event()
      .map_err(|e| protocol(format!("invalid XML: {}", e)))?;

    match event {
      Event::Start(e) => {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        stack.push(Node::named(name));
      }
      Event::Empty(e) => {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        if let Some(parent) = stack.last_mut() {
          parent.children.push(Node::named(name));
        }
      }
      Event::End(_) => {
        let node = stack.pop().ok_or_else(|| protocol("unbalanced XML"))?;
        let parent = stack.last_mut().ok_or_else(|| protocol("unbalanced XML"))?;
        parent.children.push(node);
      }
      Event::Text(t) => {
        let text = t
          .unescape()
          .map_err(|e| protocol(format!("invalid text: {}", e)))?;
        if let Some(node) = stack.last_mut() {
          node.text.push_str(&text);
        }
      }
      Event::CData(c) => {
        if let Some(node) = stack.last_mut() {
          node.text.push_str(&String::from_utf8_lossy(&c));
        }
      }
      Event::Eof => break,
      _ => {}
    }
  }

  let document = match stack.pop() {
    Some(document) if stack.is_empty() => document,
    _ => return Err(protocol("unexpected end of document")),
  };

  document
    .children
    .into_iter()
    .next()
    .ok_or_else(|| protocol("empty document"))
}

fn decode_value(value: &Node) -> Result<Value, RemoteCallError> {
  // An untyped <value> is a string, whitespace included.
  let Some(typed) = value.children.first() else {
    return Ok(Value::String(value.text.clone()));
  };

  let text = typed.text.trim();

  match typed.name.as_str() {
    "string" => Ok(Value::String(typed.text.clone())),
    "int" | "i4" | "i8" => text
      .parse::<i64>()
      .map(Value::from)
      .map_err(|_| protocol(format!("invalid integer '{}'", text))),
    "boolean" => match text {
      "1" => Ok(Value::Bool(true)),
      "0" => Ok(Value::Bool(false)),
      other => Err(protocol(format!("invalid boolean '{}'", other))),
    },
    "double" => text
      .parse::<f64>()
      .ok()
      .and_then(serde_json::Number::from_f64)
      .map(Value::Number)
      .ok_or_else(|| protocol(format!("invalid double '{}'", text))),
    "dateTime.iso8601" | "base64" => Ok(Value::String(text.to_string())),
    "nil" => Ok(Value::Null),
    "array" => {
      let data = typed
        .child("data")
        .ok_or_else(|| protocol("array without data"))?;
      data
        .children_named("value")
        .map(decode_value)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
    }
    "struct" => {
      let mut map = Map::new();
      for member in typed.children_named("member") {
        let name = member
          .child("name")
          .ok_or_else(|| protocol("struct member without a name"))?;
        let value = member
          .child("value")
          .ok_or_else(|| protocol(format!("struct member '{}' without a value", name.text)))?;
        map.insert(name.text.clone(), decode_value(value)?);
      }
      Ok(Value::Object(map))
    }
    other => Err(protocol(format!("unknown value type <{}>", other))),
  }
}

fn fault_error(fault: &Value) -> RemoteCallError {
  let code = fault.get("faultCode").and_then(Value::as_i64).unwrap_or(0);
  let message = fault
    .get("faultString")
    .and_then(Value::as_str)
    .unwrap_or("unknown fault")
    .to_string();

  RemoteCallError::Fault { code, message }
}

fn protocol(message: impl Into<String>) -> RemoteCallError {
  RemoteCallError::Protocol {
    message: message.into(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_decode_string_id() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<methodResponse>
  <params>
    <param>
      <value>
      <string>42</string>
      </value>
    </param>
  </params>
</methodResponse>"#;

    assert_eq!(decode_method_response(xml).unwrap(), json!("42"));
  }

  #[test]
  fn test_decode_untyped_value() {
    let xml = "<methodResponse><params><param><value> hi </value></param></params></methodResponse>";
    assert_eq!(decode_method_response(xml).unwrap(), json!(" hi "));
  }

  #[test]
  fn test_decode_struct() {
    let xml = r#"<methodResponse><params><param><value><struct>
      <member><name>post_id</name><value><string>7</string></value></member>
      <member><name>post_title</name><value><string>Fish &amp; Chips</string></value></member>
      <member><name>post_date</name><value><dateTime.iso8601>20240101T10:00:00</dateTime.iso8601></value></member>
      <member><name>sticky</name><value><boolean>0</boolean></value></member>
      <member><name>comment_count</name><value><int>3</int></value></member>
      <member><name>terms</name><value><array><data>
        <value><struct><member><name>name</name><value>news</value></member></struct></value>
      </data></array></value></member>
    </struct></value></param></params></methodResponse>"#;

    let post = decode_method_response(xml).unwrap();

    assert_eq!(
      post,
      json!({
        "post_id": "7",
        "post_title": "Fish & Chips",
        "post_date": "20240101T10:00:00",
        "sticky": false,
        "comment_count": 3,
        "terms": [{"name": "news"}]
      })
    );
  }

  #[test]
  fn test_decode_fault() {
    let xml = r#"<methodResponse><fault><value><struct>
      <member><name>faultCode</name><value><int>403</int></value></member>
      <member><name>faultString</name><value><string>Incorrect username or password.</string></value></member>
    </struct></value></fault></methodResponse>"#;

    let err = decode_method_response(xml).unwrap_err();
    match err {
      RemoteCallError::Fault { code, message } => {
        assert_eq!(code, 403);
        assert_eq!(message, "Incorrect username or password.");
      }
      other => panic!("expected fault, got {:?}", other),
    }
  }

  #[test]
  fn test_decode_malformed() {
    let err = decode_method_response("<methodResponse><params>").unwrap_err();
    assert!(matches!(err, RemoteCallError::Protocol { .. }));

    let err = decode_method_response("<html><body>Not Found</body></html>").unwrap_err();
    assert!(matches!(err, RemoteCallError::Protocol { .. }));
  }

  #[test]
  fn test_decode_missing_value() {
    let err = decode_method_response("<methodResponse><params/></methodResponse>").unwrap_err();
    assert!(matches!(err, RemoteCallError::Protocol { .. }));
  }
}
