//! Conversions between JSON payloads and Qdrant values, plus stable point ids.

use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{ListValue, PointId, Struct, Value as QValue};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Deterministic UUIDv5 for a readable id, so re-syncs overwrite instead of duplicating.
pub fn stable_uuid(id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes()).to_string()
}

/// Converts one JSON value into a Qdrant value (nested lists/objects included).
pub fn json_to_qvalue(v: Value) -> QValue {
    let kind = match v {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Kind::IntegerValue(i),
            None => Kind::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Kind::StringValue(s),
        Value::Array(items) => Kind::ListValue(ListValue {
            values: items.into_iter().map(json_to_qvalue).collect(),
        }),
        Value::Object(obj) => Kind::StructValue(Struct {
            fields: obj
                .into_iter()
                .map(|(k, v)| (k, json_to_qvalue(v)))
                .collect(),
        }),
    };
    QValue { kind: Some(kind) }
}

/// Converts a JSON object into a Qdrant payload map.
pub fn json_to_payload(obj: Map<String, Value>) -> HashMap<String, QValue> {
    obj.into_iter().map(|(k, v)| (k, json_to_qvalue(v))).collect()
}

/// Converts a Qdrant value back into JSON.
pub fn qvalue_to_json(v: QValue) -> Value {
    match v.kind {
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(f)) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(qvalue_to_json).collect())
        }
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, qvalue_to_json(v)))
                .collect(),
        ),
        Some(Kind::NullValue(_)) | None => Value::Null,
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into a JSON object.
pub fn payload_to_json(p: HashMap<String, QValue>) -> Map<String, Value> {
    p.into_iter().map(|(k, v)| (k, qvalue_to_json(v))).collect()
}

/// Renders a point id as a string (`uuid` or decimal number).
pub fn point_id_to_string(id: Option<PointId>) -> String {
    match id.and_then(|p| p.point_id_options) {
        Some(PointIdOptions::Uuid(u)) => u,
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    }
}
