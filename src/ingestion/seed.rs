//! Seed files: a JSON array of tool rows, loaded into the memory store at startup.

use crate::store::Row;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("seed file {path} is not valid JSON: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("seed file {0} must contain a JSON array of row objects (optionally under \"tools\")")]
    Shape(String),
}

/// Reads rows from `path`. Accepts a bare array or `{ "tools": [...] }`.
///
/// Non-object entries are skipped with a warning; typed validation happens
/// later when the rows are mapped.
pub fn load_seed_rows(path: &Path) -> Result<Vec<Row>, SeedError> {
    let shown = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: shown.clone(),
        source,
    })?;
    let json: Value = serde_json::from_str(&text).map_err(|source| SeedError::Json {
        path: shown.clone(),
        source,
    })?;

    let entries = match json {
        Value::Array(entries) => entries,
        Value::Object(mut obj) => match obj.remove("tools") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(SeedError::Shape(shown)),
        },
        _ => return Err(SeedError::Shape(shown)),
    };

    let mut rows = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::Object(row) => rows.push(row),
            other => tracing::warn!(index = idx, value = %other, "Skipping non-object seed entry"),
        }
    }

    tracing::info!(path = %shown, rows = rows.len(), "Seed rows loaded");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_bare_array() {
        let file = write(r#"[{"id": "a", "name": "A"}, 3, {"id": "b", "name": "B"}]"#);
        let rows = load_seed_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["id"], "b");
    }

    #[test]
    fn test_loads_wrapped_array() {
        let file = write(r#"{"tools": [{"id": "a"}]}"#);
        assert_eq!(load_seed_rows(file.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let file = write(r#"{"items": []}"#);
        assert!(matches!(load_seed_rows(file.path()), Err(SeedError::Shape(_))));
        let file = write("not json");
        assert!(matches!(load_seed_rows(file.path()), Err(SeedError::Json { .. })));
    }
}
