//! Data store collaborator.
//!
//! A generic table CRUD interface over untyped JSON rows, matching what a
//! hosted relational backend exposes. Typed mapping happens in `ingestion`.

pub mod memory;
pub mod rest;

pub use memory::InMemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// One untyped row, keyed by column name.
pub type Row = Map<String, Value>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("row '{id}' not found in {table}")]
    NotFound { table: Table, id: String },

    #[error("request to data store failed: {0}")]
    Transport(String),

    #[error("data store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected data store response: {0}")]
    Decode(String),

    #[error("data store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

/// Tables the service reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Tools,
    Submissions,
    SavedTools,
    Reviews,
    Comments,
    NewsletterSubscribers,
    CareerApplications,
    Admins,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Tools => "tools",
            Table::Submissions => "tool_submissions",
            Table::SavedTools => "saved_tools",
            Table::Reviews => "reviews",
            Table::Comments => "comments",
            Table::NewsletterSubscribers => "newsletter_subscribers",
            Table::CareerApplications => "career_applications",
            Table::Admins => "admin_users",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Equality conditions, AND-combined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    conditions: Vec<(String, Value)>,
}

impl RowFilter {
    /// A filter that keeps every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Numbers and strings compare by their text, as `eq.` operands do on
    /// the hosted backend, so `7` matches `"7"`.
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions
            .iter()
            .all(|(column, expected)| row.get(column).is_some_and(|v| same_value(v, expected)))
    }
}

fn same_value(stored: &Value, expected: &Value) -> bool {
    match (stored, expected) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        _ => stored == expected,
    }
}

/// Reads the `id` column of a row as a string, accepting numeric ids.
pub fn row_id(row: &Row) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Generic CRUD surface of the hosted backend.
///
/// Every implementation returns rows of a table in insertion order.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// All columns of the rows matching `filter`.
    async fn select(&self, table: Table, filter: &RowFilter) -> StoreResult<Vec<Row>>;

    async fn select_by_id(&self, table: Table, id: &str) -> StoreResult<Option<Row>>;

    /// Rows whose id is in `ids`, in table order.
    async fn select_by_ids(&self, table: Table, ids: &[String]) -> StoreResult<Vec<Row>>;

    /// Inserts a row and returns it as stored (with a generated `id` and
    /// `created_at` when the row had none).
    async fn insert_one(&self, table: Table, row: Row) -> StoreResult<Row>;

    async fn insert_many(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>>;

    /// Merges `patch` into the row with `id`. Fails with `NotFound` if absent.
    async fn update_by_id(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row>;

    /// Returns true if a row was deleted.
    async fn delete_by_id(&self, table: Table, id: &str) -> StoreResult<bool>;

    /// Deletes every row matching `filter`, whether or not it has an `id`
    /// column. Returns how many rows were deleted.
    async fn delete_where(&self, table: Table, filter: &RowFilter) -> StoreResult<usize>;
}
