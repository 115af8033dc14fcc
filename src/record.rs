//! Hydration of server payloads into entity records.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::ClientError;

/// Name of the identifier property on every SmartData entity.
pub const ID_FIELD: &str = "_id";

/// Properties of one remote entity exactly as the server returned them.
///
/// Holds every top-level property of the payload, unknown ones included, and
/// nothing else. `_id` must be a non-empty string.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    id: String,
    properties: Map<String, Value>,
}

impl Record {
    /// Builds a record from a decoded payload.
    ///
    /// `kind` names the entity in [`ClientError::MissingIdentifier`].
    pub fn from_value(kind: &'static str, value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Object(properties) => Self::from_properties(kind, properties),
            other => Err(ClientError::UnexpectedResponse(format!(
                "expected a {kind} object, got {other}"
            ))),
        }
    }

    fn from_properties(
        kind: &'static str,
        properties: Map<String, Value>,
    ) -> Result<Self, ClientError> {
        let id = match properties.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => return Err(ClientError::MissingIdentifier(kind)),
        };
        Ok(Self { id, properties })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns one property, `_id` included.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.properties.serialize(serializer)
    }
}

#[derive(Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    results: Vec<Value>,
}

/// Decodes a single entity body.
pub(crate) fn decode_record(kind: &'static str, body: &str) -> Result<Record, ClientError> {
    Record::from_value(kind, serde_json::from_str(body)?)
}

/// Decodes a list body, keeping the server's order. A missing `results`
/// sequence is an empty list.
pub(crate) fn decode_records(kind: &'static str, body: &str) -> Result<Vec<Record>, ClientError> {
    let envelope: ListEnvelope = serde_json::from_str(body)?;
    envelope
        .results
        .into_iter()
        .map(|value| Record::from_value(kind, value))
        .collect()
}

/// Decodes a body and takes the sub-structure at a JSON pointer.
pub(crate) fn decode_at(body: &str, pointer: &str) -> Result<Value, ClientError> {
    let mut value: Value = serde_json::from_str(body)?;
    value
        .pointer_mut(pointer)
        .map(Value::take)
        .ok_or_else(|| ClientError::UnexpectedResponse(format!("response has no '{pointer}'")))
}

/// Decodes a body that may legitimately be empty.
pub(crate) fn decode_value(body: &str) -> Result<Value, ClientError> {
    if body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        Ok(serde_json::from_str(body)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Record, decode_at, decode_record, decode_records, decode_value};
    use crate::ClientError;

    #[test]
    fn record_exposes_exactly_the_payload_properties() {
        let payload = json!({"_id": "s1", "name": "sensors", "meta": {"unit": "C"}});
        let record = Record::from_value("stream", payload.clone()).expect("valid record");
        assert_eq!(record.id(), "s1");
        assert_eq!(record.get("name"), Some(&json!("sensors")));
        assert_eq!(record.get("meta"), Some(&json!({"unit": "C"})));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.properties().len(), 3);
        assert_eq!(serde_json::to_value(&record).expect("serializes"), payload);
    }

    #[test]
    fn record_requires_a_string_identifier() {
        for payload in [json!({"name": "x"}), json!({"_id": ""}), json!({"_id": 7})] {
            let error = Record::from_value("source", payload).expect_err("bad id");
            assert!(matches!(error, ClientError::MissingIdentifier("source")));
        }
        let error = Record::from_value("source", json!([1, 2])).expect_err("not an object");
        assert!(matches!(error, ClientError::UnexpectedResponse(_)));
    }

    #[test]
    fn decode_records_preserves_order_and_length() {
        let body = r#"{"results":[{"_id":"s2"},{"_id":"s1"},{"_id":"s3"}],"total":3}"#;
        let ids: Vec<_> = decode_records("stream", body)
            .expect("valid list")
            .iter()
            .map(|record| record.id().to_owned())
            .collect();
        assert_eq!(ids, ["s2", "s1", "s3"]);
        assert!(decode_records("stream", "{}").expect("no results").is_empty());
    }

    #[test]
    fn malformed_bodies_surface_as_json_errors() {
        assert!(matches!(decode_record("stream", "<html>"), Err(ClientError::Json(_))));
        assert!(matches!(decode_records("stream", ""), Err(ClientError::Json(_))));
    }

    #[test]
    fn decode_at_extracts_or_reports_missing_path() {
        let body = r#"{"fields":{"content":["a","b.c"]}}"#;
        assert_eq!(decode_at(body, "/fields/content").expect("present"), json!(["a", "b.c"]));
        let error = decode_at(r#"{"fields":{}}"#, "/fields/content").expect_err("absent");
        assert!(matches!(error, ClientError::UnexpectedResponse(_)));
    }

    #[test]
    fn decode_value_treats_empty_body_as_null() {
        assert_eq!(decode_value("  ").expect("empty"), serde_json::Value::Null);
        assert_eq!(decode_value(r#"{"ok":true}"#).expect("json"), json!({"ok": true}));
    }
}
