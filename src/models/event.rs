use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// An event row joined with the name of its organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub description: Option<String>,
    pub org_id: Option<i64>,
    /// `None` when `org_id` is null or points at a missing organization.
    pub org_name: Option<String>,
}

/// Writable event fields as submitted by a client.
///
/// Every field is optional. Absent keys stay `None` and are written as `NULL`,
/// both on create and on update, so an update replaces the whole row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPayload {
    pub title: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub description: Option<String>,
    pub org_id: Option<i64>,
}

impl EventPayload {
    /// Decodes a raw request body. Anything that is not a JSON object yields
    /// an empty payload.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self::from_map(&map),
            Ok(_) | Err(_) => Self::default(),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            title: text_field(map.get("title")),
            date: text_field(map.get("date")),
            venue: text_field(map.get("venue")),
            description: text_field(map.get("description")),
            org_id: id_field(map.get("org_id")),
        }
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// Form submissions send the selected org as a string, e.g. "1".
// Whole floats such as 1.0 are stored as integers, like SQLite's INTEGER affinity.
fn id_field(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
