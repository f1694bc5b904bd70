//! Hosted backend adapter speaking the PostgREST dialect over HTTP.

use super::{DataStore, Row, RowFilter, StoreError, StoreResult, Table};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

/// Client for `{base_url}/rest/v1/{table}` endpoints.
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|e| StoreError::Transport(format!("invalid api key header: {}", e)))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| StoreError::Transport(format!("invalid api key header: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    async fn rows(&self, response: reqwest::Response, context: &str) -> StoreResult<Vec<Row>> {
        let response = check_response(response, context).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("{}: {}", context, e)))?;
        match body {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Ok(row),
                    other => Err(StoreError::Decode(format!(
                        "{}: expected object row, got {}",
                        context, other
                    ))),
                })
                .collect(),
            Value::Object(row) => Ok(vec![row]),
            other => Err(StoreError::Decode(format!(
                "{}: expected array of rows, got {}",
                context, other
            ))),
        }
    }
}

/// Renders a JSON value as a PostgREST filter operand.
fn operand(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Query string for an equality filter, e.g. `select=*&user_id=eq.u1`.
pub fn filter_query(filter: &RowFilter) -> String {
    let mut parts = vec!["select=*".to_string()];
    for (column, value) in filter.conditions() {
        parts.push(format!(
            "{}=eq.{}",
            urlencoding::encode(column),
            urlencoding::encode(&operand(value))
        ));
    }
    parts.join("&")
}

/// Query string for an `IN` lookup on ids, e.g. `select=*&id=in.(a,b)`.
pub fn ids_query(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('"', "")))
        .collect();
    format!(
        "select=*&id=in.({})",
        urlencoding::encode(&quoted.join(","))
    )
}

fn id_query(id: &str) -> String {
    format!("id=eq.{}", urlencoding::encode(id))
}

async fn check_response(
    response: reqwest::Response,
    context: &str,
) -> StoreResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status,
        message: format!("{}: {}", context, body),
    })
}

fn transport(context: &str, err: reqwest::Error) -> StoreError {
    StoreError::Transport(format!("{}: {}", context, err))
}

#[async_trait]
impl DataStore for RestStore {
    async fn select(&self, table: Table, filter: &RowFilter) -> StoreResult<Vec<Row>> {
        let url = format!("{}?{}", self.table_url(table), filter_query(filter));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport("select", e))?;
        self.rows(response, "select").await
    }

    async fn select_by_id(&self, table: Table, id: &str) -> StoreResult<Option<Row>> {
        let url = format!("{}?select=*&{}", self.table_url(table), id_query(id));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport("select_by_id", e))?;
        Ok(self.rows(response, "select_by_id").await?.into_iter().next())
    }

    async fn select_by_ids(&self, table: Table, ids: &[String]) -> StoreResult<Vec<Row>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}?{}", self.table_url(table), ids_query(ids));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport("select_by_ids", e))?;
        self.rows(response, "select_by_ids").await
    }

    async fn insert_one(&self, table: Table, row: Row) -> StoreResult<Row> {
        self.insert_many(table, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn insert_many(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await
            .map_err(|e| transport("insert", e))?;
        self.rows(response, "insert").await
    }

    async fn update_by_id(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row> {
        let url = format!("{}?{}", self.table_url(table), id_query(id));
        let response = self
            .client
            .patch(&url)
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await
            .map_err(|e| transport("update", e))?;
        self.rows(response, "update")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound {
                table,
                id: id.to_string(),
            })
    }

    async fn delete_by_id(&self, table: Table, id: &str) -> StoreResult<bool> {
        let url = format!("{}?{}", self.table_url(table), id_query(id));
        let response = self
            .client
            .delete(&url)
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| transport("delete", e))?;
        Ok(!self.rows(response, "delete").await?.is_empty())
    }

    async fn delete_where(&self, table: Table, filter: &RowFilter) -> StoreResult<usize> {
        let url = format!("{}?{}", self.table_url(table), filter_query(filter));
        let response = self
            .client
            .delete(&url)
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| transport("delete_where", e))?;
        Ok(self.rows(response, "delete_where").await?.len())
    }
}
