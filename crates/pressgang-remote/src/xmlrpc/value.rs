use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;

use crate::types::{PostContent, TermsNames};

const DATE_TIME_FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// A value as XML-RPC can carry it.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlRpcValue {
  Int(i64),
  Bool(bool),
  Double(f64),
  String(String),
  DateTime(DateTime<Utc>),
  Array(Vec<XmlRpcValue>),
  Struct(Vec<(String, XmlRpcValue)>),
}

impl XmlRpcValue {
  /// Convert an opaque JSON value.
  ///
  /// XML-RPC has no null, so `null` converts to `None`; nulls inside arrays
  /// and objects are dropped.
  pub fn from_json(value: &serde_json::Value) -> Option<Self> {
    use serde_json::Value;

    match value {
      Value::Null => None,
      Value::Bool(b) => Some(Self::Bool(*b)),
      Value::Number(n) => match n.as_i64() {
        Some(i) => Some(Self::Int(i)),
        None => n.as_f64().map(Self::Double),
      },
      Value::String(s) => Some(Self::String(s.clone())),
      Value::Array(items) => Some(Self::Array(
        items.iter().filter_map(Self::from_json).collect(),
      )),
      Value::Object(map) => Some(Self::Struct(
        map
          .iter()
          .filter_map(|(k, v)| Self::from_json(v).map(|v| (k.clone(), v)))
          .collect(),
      )),
    }
  }

  fn write_to(&self, out: &mut String) {
    out.push_str("<value>");
    match self {
      Self::Int(i) => {
        let _ = write!(out, "<int>{}</int>", i);
      }
      Self::Bool(b) => {
        let _ = write!(out, "<boolean>{}</boolean>", if *b { 1 } else { 0 });
      }
      Self::Double(d) => {
        let _ = write!(out, "<double>{}</double>", d);
      }
      Self::String(s) => {
        out.push_str("<string>");
        out.push_str(&escape(s.as_str()));
        out.push_str("</string>");
      }
      Self::DateTime(dt) => {
        let _ = write!(
          out,
          "<dateTime.iso8601>{}</dateTime.iso8601>",
          dt.format(DATE_TIME_FORMAT)
        );
      }
      Self::Array(items) => {
        out.push_str("<array><data>");
        for item in items {
          item.write_to(out);
        }
        out.push_str("</data></array>");
      }
      Self::Struct(members) => {
        out.push_str("<struct>");
        for (name, value) in members {
          out.push_str("<member><name>");
          out.push_str(&escape(name.as_str()));
          out.push_str("</name>");
          value.write_to(out);
          out.push_str("</member>");
        }
        out.push_str("</struct>");
      }
    }
    out.push_str("</value>");
  }
}

impl From<&str> for XmlRpcValue {
  fn from(s: &str) -> Self {
    Self::String(s.to_string())
  }
}

impl From<&TermsNames> for XmlRpcValue {
  fn from(terms: &TermsNames) -> Self {
    let list = |terms: &[String]| Self::Array(terms.iter().map(|t| t.as_str().into()).collect());

    Self::Struct(vec![
      ("category".to_string(), list(&terms.category)),
      ("post_tag".to_string(), list(&terms.post_tag)),
    ])
  }
}

impl From<&PostContent> for XmlRpcValue {
  fn from(content: &PostContent) -> Self {
    let mut members = vec![
      ("post_status".to_string(), content.post_status.as_str().into()),
      ("post_date".to_string(), Self::DateTime(content.post_date)),
      (
        "post_content".to_string(),
        content.post_content.as_str().into(),
      ),
      ("post_title".to_string(), content.post_title.as_str().into()),
      ("post_name".to_string(), content.post_name.as_str().into()),
      ("post_author".to_string(), content.post_author.as_str().into()),
      ("terms_names".to_string(), (&content.terms_names).into()),
    ];

    if let Some(custom_fields) = content.custom_fields.as_ref().and_then(Self::from_json) {
      members.push(("custom_fields".to_string(), custom_fields));
    }

    Self::Struct(members)
  }
}

/// Serialize a `methodCall` document.
pub fn encode_method_call(method: &str, params: &[XmlRpcValue]) -> String {
  let mut out = String::from(r#"<?xml version="1.0"?><methodCall><methodName>"#);
  out.push_str(&escape(method));
  out.push_str("</methodName><params>");
  for param in params {
    out.push_str("<param>");
    param.write_to(&mut out);
    out.push_str("</param>");
  }
  out.push_str("</params></methodCall>");
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use serde_json::json;

  #[test]
  fn test_encode_scalars() {
    let body = encode_method_call(
      "demo.call",
      &[
        XmlRpcValue::Int(42),
        XmlRpcValue::Bool(true),
        XmlRpcValue::String("a < b & c".to_string()),
      ],
    );

    assert!(body.starts_with(r#"<?xml version="1.0"?><methodCall><methodName>demo.call</methodName>"#));
    assert!(body.contains("<param><value><int>42</int></value></param>"));
    assert!(body.contains("<value><boolean>1</boolean></value>"));
    assert!(body.contains("<string>a &lt; b &amp; c</string>"));
    assert!(body.ends_with("</params></methodCall>"));
  }

  #[test]
  fn test_encode_date_time() {
    let date = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
    let body = encode_method_call("demo.call", &[XmlRpcValue::DateTime(date)]);

    assert!(body.contains("<dateTime.iso8601>20240309T07:05:01</dateTime.iso8601>"));
  }

  #[test]
  fn test_empty_terms_still_encoded() {
    let value: XmlRpcValue = (&TermsNames::default()).into();
    let body = encode_method_call("demo.call", &[value]);

    assert!(body.contains(
      "<member><name>category</name><value><array><data></data></array></value></member>"
    ));
    assert!(body.contains(
      "<member><name>post_tag</name><value><array><data></data></array></value></member>"
    ));
  }

  #[test]
  fn test_from_json_drops_nulls() {
    let value = XmlRpcValue::from_json(&json!([
      {"key": "source", "value": "feed"},
      null,
      {"key": "score", "value": 1.5, "extra": null}
    ]))
    .unwrap();

    assert_eq!(
      value,
      XmlRpcValue::Array(vec![
        XmlRpcValue::Struct(vec![
          ("key".to_string(), XmlRpcValue::String("source".to_string())),
          ("value".to_string(), XmlRpcValue::String("feed".to_string())),
        ]),
        XmlRpcValue::Struct(vec![
          ("key".to_string(), XmlRpcValue::String("score".to_string())),
          ("value".to_string(), XmlRpcValue::Double(1.5)),
        ]),
      ])
    );
    assert!(XmlRpcValue::from_json(&json!(null)).is_none());
  }

  #[test]
  fn test_post_content_members() {
    let content = PostContent {
      post_status: "draft".to_string(),
      post_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
      post_content: "World".to_string(),
      post_title: "Hello".to_string(),
      post_name: "hello".to_string(),
      post_author: "1".to_string(),
      terms_names: TermsNames {
        category: vec!["news".to_string()],
        post_tag: vec![],
      },
      custom_fields: None,
    };

    let XmlRpcValue::Struct(members) = XmlRpcValue::from(&content) else {
      panic!("expected a struct");
    };
    let names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();

    assert_eq!(
      names,
      vec![
        "post_status",
        "post_date",
        "post_content",
        "post_title",
        "post_name",
        "post_author",
        "terms_names",
      ]
    );
  }
}
