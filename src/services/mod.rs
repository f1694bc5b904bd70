//! Operations over the external collaborators.
//!
//! Each function issues its requests in sequence and surfaces the first
//! failure; nothing is retried or rolled back.

pub mod admin;
pub mod engagement;
pub mod intake;
pub mod tools;

use crate::error::{AppError, Result};
use crate::store::Row;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes a stored row into a typed record.
pub(crate) fn decode_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| AppError::MappingError(e.to_string()))
}

/// Newest first; rows without a timestamp keep their order at the end.
pub(crate) fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> Option<i64>) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

/// Accepts a string or numeric id column.
pub(crate) fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde::Deserialize;
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected an id, got {}", other))),
    }
}

/// Accepts unix milliseconds or an RFC 3339 timestamp.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde::Deserialize;
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom("timestamp out of range")),
        Value::String(s) => chrono::DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.timestamp_millis()))
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", s, e))),
        other => Err(D::Error::custom(format!("expected a timestamp, got {}", other))),
    }
}
