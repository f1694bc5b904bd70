//! In-memory data store for local runs and tests.

use super::{row_id, DataStore, Row, RowFilter, StoreError, StoreResult, Table};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Table-per-`Vec` store. Clone-friendly via Arc; rows keep insertion order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<Table, Vec<Row>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills in `id` and `created_at` the way the hosted backend's column defaults do.
    fn with_defaults(mut row: Row) -> Row {
        if row_id(&row).is_none() {
            row.insert(
                "id".to_string(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }
        if !row.contains_key("created_at") {
            row.insert(
                "created_at".to_string(),
                Value::from(chrono::Utc::now().timestamp_millis()),
            );
        }
        row
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn select(&self, table: Table, filter: &RowFilter) -> StoreResult<Vec<Row>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::LockPoisoned("select"))?;
        Ok(tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn select_by_id(&self, table: Table, id: &str) -> StoreResult<Option<Row>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::LockPoisoned("select_by_id"))?;
        Ok(tables.get(&table).and_then(|rows| {
            rows.iter()
                .find(|r| row_id(r).as_deref() == Some(id))
                .cloned()
        }))
    }

    async fn select_by_ids(&self, table: Table, ids: &[String]) -> StoreResult<Vec<Row>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::LockPoisoned("select_by_ids"))?;
        Ok(tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| row_id(r).is_some_and(|id| ids.contains(&id)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_one(&self, table: Table, row: Row) -> StoreResult<Row> {
        let row = Self::with_defaults(row);
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::LockPoisoned("insert_one"))?;
        tables.entry(table).or_default().push(row.clone());
        Ok(row)
    }

    async fn insert_many(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        let rows: Vec<Row> = rows.into_iter().map(Self::with_defaults).collect();
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::LockPoisoned("insert_many"))?;
        tables.entry(table).or_default().extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn update_by_id(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::LockPoisoned("update_by_id"))?;
        let row = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r).as_deref() == Some(id)))
            .ok_or_else(|| StoreError::NotFound {
                table,
                id: id.to_string(),
            })?;
        for (column, value) in patch {
            // ids are immutable
            if column != "id" {
                row.insert(column, value);
            }
        }
        Ok(row.clone())
    }

    async fn delete_by_id(&self, table: Table, id: &str) -> StoreResult<bool> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::LockPoisoned("delete_by_id"))?;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| row_id(r).as_deref() != Some(id));
        Ok(rows.len() != before)
    }

    async fn delete_where(&self, table: Table, filter: &RowFilter) -> StoreResult<usize> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::LockPoisoned("delete_where"))?;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !filter.matches(r));
        Ok(before - rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_keeps_order() {
        let store = InMemoryStore::new();
        let first = store
            .insert_one(Table::Tools, row(json!({"name": "first"})))
            .await
            .unwrap();
        store
            .insert_many(
                Table::Tools,
                vec![row(json!({"id": "b", "name": "second"})), row(json!({"name": "third"}))],
            )
            .await
            .unwrap();

        assert!(row_id(&first).is_some());
        assert!(first.contains_key("created_at"));

        let names: Vec<Value> = store
            .select(Table::Tools, &RowFilter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("first"), json!("second"), json!("third")]);
    }

    #[tokio::test]
    async fn test_update_merges_and_preserves_id() {
        let store = InMemoryStore::new();
        store
            .insert_one(Table::Tools, row(json!({"id": "t1", "name": "old", "rating": 3.0})))
            .await
            .unwrap();
        let updated = store
            .update_by_id(Table::Tools, "t1", row(json!({"id": "t2", "name": "new"})))
            .await
            .unwrap();
        assert_eq!(updated["id"], "t1");
        assert_eq!(updated["name"], "new");
        assert_eq!(updated["rating"], 3.0);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .update_by_id(Table::Tools, "nope", Row::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_select_by_ids_and_delete() {
        let store = InMemoryStore::new();
        for id in ["a", "b", "c"] {
            store
                .insert_one(Table::Tools, row(json!({ "id": id })))
                .await
                .unwrap();
        }
        let rows = store
            .select_by_ids(Table::Tools, &["c".to_string(), "a".to_string()])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        assert!(store.delete_by_id(Table::Tools, "b").await.unwrap());
        assert!(!store.delete_by_id(Table::Tools, "b").await.unwrap());
        assert!(store.select_by_id(Table::Tools, "b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_where_removes_every_match() {
        let store = InMemoryStore::new();
        for (user, tool) in [("u1", "a"), ("u1", "a"), ("u1", "b"), ("u2", "a")] {
            store
                .insert_one(Table::SavedTools, row(json!({"user_id": user, "tool_id": tool})))
                .await
                .unwrap();
        }
        let filter = RowFilter::all().eq("user_id", "u1").eq("tool_id", "a");
        assert_eq!(store.delete_where(Table::SavedTools, &filter).await.unwrap(), 2);
        assert_eq!(store.delete_where(Table::SavedTools, &filter).await.unwrap(), 0);
        assert_eq!(
            store.select(Table::SavedTools, &RowFilter::all()).await.unwrap().len(),
            2
        );
        assert_eq!(store.delete_where(Table::Reviews, &filter).await.unwrap(), 0);
    }
}
