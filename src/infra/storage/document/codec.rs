//! Conversion between plain JSON and Firestore typed values.
//!
//! Entities go through `serde_json::Value` first, so anything that
//! serializes to JSON can be stored. Timestamps travel as RFC 3339
//! strings.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Number, Value};

use crate::errors::{AppError, AppResult};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // int64 travels as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(map: &Map<String, Value>) -> Value {
    let fields: Map<String, Value> = map
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect();
    Value::Object(fields)
}

pub fn decode_value(value: &Value) -> AppResult<Value> {
    let (kind, inner) = value
        .as_object()
        .and_then(|m| m.iter().next())
        .ok_or_else(|| AppError::document_store("Malformed Firestore value"))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "stringValue" | "timestampValue" | "referenceValue" | "bytesValue"
        | "geoPointValue" => Ok(inner.clone()),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| AppError::document_store(format!("Invalid integerValue: {}", inner)))
        }
        "doubleValue" => {
            let parsed = match inner {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            // NaN and infinities have no JSON form
            Ok(parsed
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null))
        }
        "arrayValue" => {
            let values = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values.iter().map(decode_value).collect::<AppResult<Vec<_>>>()?,
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => decode_fields(inner.get("fields")).map(Value::Object),
        other => Err(AppError::document_store(format!(
            "Unsupported Firestore value type: {}",
            other
        ))),
    }
}

/// Decode a `fields` object; an absent object is an empty map.
pub fn decode_fields(fields: Option<&Value>) -> AppResult<Map<String, Value>> {
    let Some(fields) = fields.and_then(Value::as_object) else {
        return Ok(Map::new());
    };

    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Last path segment of a document name.
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Flatten a Firestore document into plain JSON with its id under `id`.
pub fn decode_document(doc: &Value) -> AppResult<Map<String, Value>> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::document_store("Document without a name"))?;

    let mut map = decode_fields(doc.get("fields"))?;
    map.insert("id".to_string(), Value::String(document_id(name).to_string()));
    Ok(map)
}

pub fn from_document<T: DeserializeOwned>(doc: &Value) -> AppResult<T> {
    let map = decode_document(doc)?;
    serde_json::from_value(Value::Object(map))
        .map_err(|e| AppError::document_store(format!("Undecodable document: {}", e)))
}

/// Encode an entity as document fields. The id lives in the document name
/// and is not stored as a field.
pub fn to_fields<T: Serialize>(entity: &T) -> AppResult<Value> {
    match serde_json::to_value(entity)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(encode_fields(&map))
        }
        _ => Err(AppError::internal("Entities must serialize to JSON objects")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Notification, NotificationKind};
    use chrono::Utc;

    #[test]
    fn test_scalar_encoding() {
        assert_eq!(encode_value(&json!(42)), json!({ "integerValue": "42" }));
        assert_eq!(encode_value(&json!(1.5)), json!({ "doubleValue": 1.5 }));
        assert_eq!(encode_value(&json!("x")), json!({ "stringValue": "x" }));
        assert_eq!(encode_value(&json!(null)), json!({ "nullValue": null }));
    }

    #[test]
    fn test_nested_values_decode() {
        let stored = json!({
            "mapValue": { "fields": {
                "tags": { "arrayValue": { "values": [
                    { "stringValue": "rust" },
                    { "integerValue": "7" }
                ] } },
                "empty": { "arrayValue": {} }
            } }
        });

        let decoded = decode_value(&stored).unwrap();
        assert_eq!(decoded, json!({ "tags": ["rust", 7], "empty": [] }));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(decode_value(&json!({ "vectorValue": {} })).is_err());
        assert!(decode_value(&json!({ "integerValue": "seven" })).is_err());
    }

    #[test]
    fn test_document_round_trip_keeps_id_in_name() {
        let notification = Notification {
            id: "n1".into(),
            user_id: "u1".into(),
            title: "Timesheet approved".into(),
            message: "Your week 12 timesheet was approved".into(),
            kind: NotificationKind::Success,
            is_read: false,
            created_at: Utc::now(),
        };

        let fields = to_fields(&notification).unwrap();
        assert!(fields.get("id").is_none());
        assert_eq!(fields["type"], json!({ "stringValue": "success" }));

        let doc = json!({
            "name": "projects/demo/databases/(default)/documents/notifications/n1",
            "fields": fields,
        });
        let decoded: Notification = from_document(&doc).unwrap();
        assert_eq!(decoded, notification);
    }
}
