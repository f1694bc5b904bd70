//! Mapping between storage rows and the typed `Tool` entity.
//!
//! Rows use the backend's lowercase column names (`shortdescription`,
//! `reviewcount`, `apiaccess`, `usecases`). A row either maps completely or
//! fails with a `MappingError`; there is no partially populated `Tool`.

use crate::catalog::types::{Pricing, Tool, MAX_RATING};
use crate::store::Row;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MappingError {
    #[error("row is not a valid tool record: {0}")]
    Malformed(String),

    #[error("tool '{id}' has an empty name")]
    EmptyName { id: String },

    #[error("tool '{id}' has unknown pricing label '{label}'")]
    UnknownPricing { id: String, label: String },

    #[error("tool '{id}' has a non-finite rating")]
    InvalidRating { id: String },

    #[error("tool '{id}' has an unparseable created_at '{value}'")]
    InvalidTimestamp { id: String, value: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowId {
    Text(String),
    Number(i64),
}

impl RowId {
    fn into_string(self) -> String {
        match self {
            RowId::Text(s) => s,
            RowId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Labels {
    Many(Vec<String>),
    One(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Millis(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct ToolRow {
    id: RowId,
    name: String,
    pricing: String,
    #[serde(default)]
    category: Option<Labels>,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    shortdescription: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    reviewcount: Option<u64>,
    #[serde(default)]
    features: Option<Vec<String>>,
    #[serde(default)]
    apiaccess: Option<bool>,
    #[serde(default)]
    pros: Option<Vec<String>>,
    #[serde(default)]
    cons: Option<Vec<String>>,
    #[serde(default)]
    usecases: Option<Vec<String>>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    created_at: Option<Timestamp>,
}

fn parse_timestamp(id: &str, ts: Timestamp) -> Result<i64, MappingError> {
    match ts {
        Timestamp::Millis(ms) => Ok(ms),
        Timestamp::Text(text) => chrono::DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.timestamp_millis())
            .or_else(|_| text.parse::<i64>())
            .map_err(|_| MappingError::InvalidTimestamp {
                id: id.to_string(),
                value: text,
            }),
    }
}

/// Maps one storage row into a `Tool`.
pub fn map_row(row: &Row) -> Result<Tool, MappingError> {
    let raw: ToolRow = serde_json::from_value(Value::Object(row.clone()))
        .map_err(|e| MappingError::Malformed(e.to_string()))?;
    let id = raw.id.into_string();

    let name = raw.name.trim().to_string();
    if name.is_empty() {
        return Err(MappingError::EmptyName { id });
    }

    let pricing: Pricing = raw
        .pricing
        .trim()
        .parse()
        .map_err(|_| MappingError::UnknownPricing {
            id: id.clone(),
            label: raw.pricing.clone(),
        })?;

    let rating = match raw.rating {
        Some(r) if !r.is_finite() => return Err(MappingError::InvalidRating { id }),
        Some(r) => Some(r.clamp(0.0, MAX_RATING)),
        None => None,
    };

    let created_at = raw
        .created_at
        .map(|ts| parse_timestamp(&id, ts))
        .transpose()?;

    let category = match raw.category {
        Some(Labels::Many(labels)) => labels,
        Some(Labels::One(label)) if !label.trim().is_empty() => vec![label],
        _ => Vec::new(),
    };

    Ok(Tool {
        id,
        name,
        logo: raw.logo.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        short_description: raw.shortdescription.unwrap_or_default(),
        category,
        pricing,
        rating,
        review_count: raw.reviewcount.unwrap_or(0),
        features: raw.features.unwrap_or_default(),
        api_access: raw.apiaccess.unwrap_or(false),
        pros: raw.pros,
        cons: raw.cons,
        use_cases: raw.usecases,
        url: raw.url.unwrap_or_default(),
        created_at,
    })
}

/// Maps a batch of rows, skipping (and logging) rows that fail to map.
///
/// Returns the mapped tools in row order and the number of rejected rows.
pub fn map_rows(rows: &[Row]) -> (Vec<Tool>, usize) {
    let mut tools = Vec::with_capacity(rows.len());
    let mut rejected = 0usize;

    for (idx, row) in rows.iter().enumerate() {
        match map_row(row) {
            Ok(tool) => tools.push(tool),
            Err(e) => {
                rejected += 1;
                tracing::warn!(index = idx, error = %e, "Skipping malformed tool row");
            }
        }
    }

    if rejected > 0 {
        metrics::counter!("tool_rows_rejected_total").increment(rejected as u64);
    }

    tracing::debug!(total = rows.len(), mapped = tools.len(), rejected, "Tool rows mapped");
    (tools, rejected)
}
