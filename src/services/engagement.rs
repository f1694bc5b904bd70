//! Signed-in user activity: saved tools, reviews and comments.

use super::tools::{fetch_tool, fetch_tools_by_ids};
use super::{decode_row, id_string, newest_first, timestamp};
use crate::auth::User;
use crate::catalog::Tool;
use crate::error::{AppError, Result};
use crate::forms::{CommentForm, ReviewForm, Validate};
use crate::store::{DataStore, Row, RowFilter, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Review {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub tool_id: String,
    #[serde(deserialize_with = "id_string")]
    pub user_id: String,
    pub user_email: String,
    pub rating: u8,
    pub text: String,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Comment {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub tool_id: String,
    #[serde(deserialize_with = "id_string")]
    pub user_id: String,
    pub user_email: String,
    pub body: String,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<i64>,
}

fn owned_row(user: &User, tool_id: &str) -> Row {
    let mut row = Row::new();
    row.insert("user_id".to_string(), Value::from(user.id.as_str()));
    row.insert("user_email".to_string(), Value::from(user.email.as_str()));
    row.insert("tool_id".to_string(), Value::from(tool_id));
    row
}

/// The user's saved tools, in the order they were saved.
pub async fn list_saved_tools(store: &dyn DataStore, user_id: &str) -> Result<Vec<Tool>> {
    let rows = store
        .select(Table::SavedTools, &RowFilter::all().eq("user_id", user_id))
        .await?;
    let ids: Vec<String> = rows
        .iter()
        .filter_map(|r| match r.get("tool_id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect();
    fetch_tools_by_ids(store, &ids).await
}

/// Bookmarks a tool. Returns false if it was already saved.
pub async fn save_tool(store: &dyn DataStore, user: &User, tool_id: &str) -> Result<bool> {
    fetch_tool(store, tool_id).await?;

    let filter = RowFilter::all()
        .eq("user_id", user.id.as_str())
        .eq("tool_id", tool_id);
    if !store.select(Table::SavedTools, &filter).await?.is_empty() {
        return Ok(false);
    }

    let mut row = Row::new();
    row.insert("user_id".to_string(), Value::from(user.id.as_str()));
    row.insert("tool_id".to_string(), Value::from(tool_id));
    store.insert_one(Table::SavedTools, row).await?;

    tracing::debug!(user_id = %user.id, tool_id, "Tool saved");
    Ok(true)
}

/// Removes a bookmark; `NotFoundError` if the tool was not saved.
///
/// Deletes by the (user, tool) pair, so join rows without an `id` column
/// are removed too. Success means the backend confirmed the deletion.
pub async fn remove_saved_tool(store: &dyn DataStore, user_id: &str, tool_id: &str) -> Result<()> {
    let removed = store
        .delete_where(
            Table::SavedTools,
            &RowFilter::all().eq("user_id", user_id).eq("tool_id", tool_id),
        )
        .await?;
    if removed == 0 {
        return Err(AppError::NotFoundError(format!("saved tool '{}'", tool_id)));
    }
    tracing::debug!(user_id, tool_id, removed, "Saved tool removed");
    Ok(())
}

pub async fn list_reviews(store: &dyn DataStore, tool_id: &str) -> Result<Vec<Review>> {
    let rows = store
        .select(Table::Reviews, &RowFilter::all().eq("tool_id", tool_id))
        .await?;
    let mut reviews = rows
        .into_iter()
        .map(decode_row::<Review>)
        .collect::<Result<Vec<_>>>()?;
    newest_first(&mut reviews, |r| r.created_at);
    Ok(reviews)
}

pub async fn list_user_reviews(store: &dyn DataStore, user_id: &str) -> Result<Vec<Review>> {
    let rows = store
        .select(Table::Reviews, &RowFilter::all().eq("user_id", user_id))
        .await?;
    let mut reviews = rows
        .into_iter()
        .map(decode_row::<Review>)
        .collect::<Result<Vec<_>>>()?;
    newest_first(&mut reviews, |r| r.created_at);
    Ok(reviews)
}

pub async fn create_review(
    store: &dyn DataStore,
    user: &User,
    tool_id: &str,
    form: ReviewForm,
) -> Result<Review> {
    form.validate()?;
    fetch_tool(store, tool_id).await?;

    let mut row = owned_row(user, tool_id);
    row.insert("rating".to_string(), Value::from(form.rating));
    row.insert("text".to_string(), Value::from(form.text.trim()));
    let stored = store.insert_one(Table::Reviews, row).await?;

    metrics::counter!("reviews_created_total").increment(1);
    decode_row(stored)
}

pub async fn list_comments(store: &dyn DataStore, tool_id: &str) -> Result<Vec<Comment>> {
    let rows = store
        .select(Table::Comments, &RowFilter::all().eq("tool_id", tool_id))
        .await?;
    let mut comments = rows
        .into_iter()
        .map(decode_row::<Comment>)
        .collect::<Result<Vec<_>>>()?;
    newest_first(&mut comments, |c| c.created_at);
    Ok(comments)
}

pub async fn create_comment(
    store: &dyn DataStore,
    user: &User,
    tool_id: &str,
    form: CommentForm,
) -> Result<Comment> {
    form.validate()?;
    fetch_tool(store, tool_id).await?;

    let mut row = owned_row(user, tool_id);
    row.insert("body".to_string(), Value::from(form.body.trim()));
    let stored = store.insert_one(Table::Comments, row).await?;
    decode_row(stored)
}
