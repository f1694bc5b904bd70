//! Reading tools out of the data store.

use crate::error::{AppError, Result};
use crate::ingestion::{map_row, map_rows};
use crate::catalog::Tool;
use crate::store::{DataStore, RowFilter, Table};

/// The full live catalog in store order. Malformed rows are skipped.
pub async fn fetch_all_tools(store: &dyn DataStore) -> Result<Vec<Tool>> {
    let rows = store.select(Table::Tools, &RowFilter::all()).await?;
    let (tools, _rejected) = map_rows(&rows);
    Ok(tools)
}

/// One tool by id. Missing rows are `NotFoundError`; a malformed row is a
/// server-side `MappingError`.
pub async fn fetch_tool(store: &dyn DataStore, id: &str) -> Result<Tool> {
    let row = store
        .select_by_id(Table::Tools, id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("tool '{}'", id)))?;
    Ok(map_row(&row)?)
}

/// Tools for `ids`, in the order the ids were given. Unknown ids are dropped.
pub async fn fetch_tools_by_ids(store: &dyn DataStore, ids: &[String]) -> Result<Vec<Tool>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = store.select_by_ids(Table::Tools, ids).await?;
    let (tools, _rejected) = map_rows(&rows);
    Ok(ids
        .iter()
        .filter_map(|id| tools.iter().find(|t| &t.id == id).cloned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, Row};
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .insert_many(
                Table::Tools,
                vec![
                    row(json!({"id": "a", "name": "Alpha", "pricing": "Free"})),
                    row(json!({"id": "b", "name": "Beta", "pricing": "Bogus"})),
                    row(json!({"id": "c", "name": "Gamma", "pricing": "Paid"})),
                ],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_fetch_all_skips_malformed_rows() {
        let store = seeded().await;
        let tools = fetch_all_tools(&store).await.unwrap();
        let ids: Vec<&str> = tools.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_fetch_tool_errors() {
        let store = seeded().await;
        assert_eq!(fetch_tool(&store, "a").await.unwrap().name, "Alpha");
        assert!(matches!(
            fetch_tool(&store, "zzz").await,
            Err(AppError::NotFoundError(_))
        ));
        assert!(matches!(
            fetch_tool(&store, "b").await,
            Err(AppError::MappingError(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_by_ids_keeps_request_order() {
        let store = seeded().await;
        let ids = vec!["c".to_string(), "missing".to_string(), "a".to_string()];
        let tools = fetch_tools_by_ids(&store, &ids).await.unwrap();
        let got: Vec<&str> = tools.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(got, vec!["c", "a"]);
    }
}
