//! Administrative catalog maintenance and submission review.

use super::{decode_row, id_string, newest_first, timestamp};
use crate::auth::{is_admin, User};
use crate::catalog::{Pricing, Tool};
use crate::error::{AppError, Result};
use crate::forms::{FieldErrors, ToolInput, ToolPatch, Validate};
use crate::ingestion::map_row;
use crate::store::{DataStore, Row, RowFilter, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";

/// A row of the pending submissions table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Submission {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Vec<String>,
    pub pricing: String,
    #[serde(default)]
    pub submitter_email: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<i64>,
}

/// Admin upload body: one tool or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ToolUpload {
    Bulk(Vec<ToolInput>),
    Single(ToolInput),
}

impl ToolUpload {
    pub fn into_inputs(self) -> Vec<ToolInput> {
        match self {
            ToolUpload::Bulk(inputs) => inputs,
            ToolUpload::Single(input) => vec![input],
        }
    }
}

/// Fails with `ForbiddenError` unless the user is on the admin allow-list.
pub async fn require_admin(store: &dyn DataStore, user: &User) -> Result<()> {
    if is_admin(store, &user.email).await? {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id, "Admin route refused");
        Err(AppError::ForbiddenError(
            "administrator access required".to_string(),
        ))
    }
}

/// Validates every input, then inserts them in one request.
///
/// A bulk upload is all-or-nothing at the validation step; field errors are
/// keyed `"<index>.<field>"` so the offending entry can be located.
pub async fn create_tools(store: &dyn DataStore, upload: ToolUpload) -> Result<Vec<Tool>> {
    let inputs = upload.into_inputs();
    if inputs.is_empty() {
        return Err(AppError::ValidationError(
            "upload contains no tools".to_string(),
        ));
    }

    let mut errors = FieldErrors::new();
    for (index, input) in inputs.iter().enumerate() {
        if let Err(found) = input.validate() {
            for field in found.fields() {
                let message = found.get(field).unwrap_or_default();
                if inputs.len() == 1 {
                    errors.add(field, message);
                } else {
                    errors.add(&format!("{}.{}", index, field), message);
                }
            }
        }
    }
    errors.into_result()?;

    let rows: Vec<Row> = inputs.into_iter().map(ToolInput::into_row).collect();
    let stored = if rows.len() == 1 {
        let mut rows = rows;
        vec![store.insert_one(Table::Tools, rows.remove(0)).await?]
    } else {
        store.insert_many(Table::Tools, rows).await?
    };

    let tools = stored
        .iter()
        .map(map_row)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    metrics::counter!("admin_tools_created_total").increment(tools.len() as u64);
    tracing::info!(count = tools.len(), "Tools uploaded");
    Ok(tools)
}

pub async fn update_tool(store: &dyn DataStore, id: &str, patch: ToolPatch) -> Result<Tool> {
    patch.validate()?;
    let row = patch.into_row();
    if row.is_empty() {
        return Err(AppError::ValidationError(
            "update contains no fields".to_string(),
        ));
    }
    let stored = store.update_by_id(Table::Tools, id, row).await?;
    tracing::info!(tool_id = id, "Tool updated");
    Ok(map_row(&stored)?)
}

pub async fn delete_tool(store: &dyn DataStore, id: &str) -> Result<()> {
    if !store.delete_by_id(Table::Tools, id).await? {
        return Err(AppError::NotFoundError(format!("tool '{}'", id)));
    }
    tracing::info!(tool_id = id, "Tool deleted");
    Ok(())
}

/// Submissions, newest first. `status` narrows the list when given.
pub async fn list_submissions(
    store: &dyn DataStore,
    status: Option<&str>,
) -> Result<Vec<Submission>> {
    let filter = match status {
        Some(status) => RowFilter::all().eq("status", status),
        None => RowFilter::all(),
    };
    let rows = store.select(Table::Submissions, &filter).await?;
    let mut submissions = rows
        .into_iter()
        .map(decode_row::<Submission>)
        .collect::<Result<Vec<_>>>()?;
    newest_first(&mut submissions, |s| s.created_at);
    Ok(submissions)
}

/// Copies a pending submission into the live catalog and marks it approved.
///
/// The two writes are independent; if the status update fails the tool is
/// already live and the error is returned as is.
pub async fn approve_submission(store: &dyn DataStore, id: &str) -> Result<Tool> {
    let row = store
        .select_by_id(Table::Submissions, id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("submission '{}'", id)))?;
    let submission: Submission = decode_row(row)?;

    if submission.status.as_deref() == Some(STATUS_APPROVED) {
        return Err(AppError::ConflictError(format!(
            "submission '{}' is already approved",
            id
        )));
    }

    let pricing: Pricing = submission.pricing.parse().map_err(|_| {
        AppError::ValidationError(format!(
            "submission '{}' has unknown pricing '{}'",
            id, submission.pricing
        ))
    })?;

    let tool_row = ToolInput {
        name: submission.name,
        url: submission.url,
        logo: submission.logo,
        description: submission.description,
        short_description: String::new(),
        category: submission.category,
        pricing,
        rating: None,
        review_count: 0,
        features: Vec::new(),
        api_access: false,
        pros: None,
        cons: None,
        use_cases: None,
    }
    .into_row();
    let stored = store.insert_one(Table::Tools, tool_row).await?;
    let tool = map_row(&stored)?;

    let mut status = Row::new();
    status.insert("status".to_string(), Value::from(STATUS_APPROVED));
    status.insert("tool_id".to_string(), Value::from(tool.id.as_str()));
    store.update_by_id(Table::Submissions, id, status).await?;

    metrics::counter!("submissions_approved_total").increment(1);
    tracing::info!(submission_id = id, tool_id = %tool.id, "Submission approved");
    Ok(tool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tools::fetch_all_tools;
    use crate::store::InMemoryStore;
    use serde_json::json;

    fn input(name: &str) -> ToolInput {
        serde_json::from_value(json!({
            "name": name,
            "url": "https://example.com",
            "pricing": "Free",
            "category": ["Writing"],
        }))
        .unwrap()
    }

    fn admin() -> User {
        User { id: "u1".into(), email: "Root@Example.com".into() }
    }

    #[tokio::test]
    async fn test_require_admin_uses_allow_list() {
        let store = InMemoryStore::new();
        assert!(matches!(
            require_admin(&store, &admin()).await,
            Err(AppError::ForbiddenError(_))
        ));

        let mut row = Row::new();
        row.insert("email".into(), Value::from("root@example.com"));
        store.insert_one(Table::Admins, row).await.unwrap();
        assert!(require_admin(&store, &admin()).await.is_ok());
    }

    #[test]
    fn test_upload_body_accepts_object_or_array() {
        let single: ToolUpload = serde_json::from_value(json!({
            "name": "One", "url": "https://one.example.com", "pricing": "Paid"
        }))
        .unwrap();
        assert_eq!(single.into_inputs().len(), 1);

        let bulk: ToolUpload = serde_json::from_value(json!([
            {"name": "One", "url": "https://one.example.com", "pricing": "Paid"},
            {"name": "Two", "url": "https://two.example.com", "pricing": "Free"}
        ]))
        .unwrap();
        assert_eq!(bulk.into_inputs().len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_upload_is_validated_before_insert() {
        let store = InMemoryStore::new();
        let mut bad = input("Broken");
        bad.url = "not a url".into();

        let err = create_tools(&store, ToolUpload::Bulk(vec![input("Fine"), bad]))
            .await
            .unwrap_err();
        match err {
            AppError::FieldError(errors) => assert!(errors.get("1.url").is_some()),
            other => panic!("unexpected error: {other}"),
        }
        assert!(fetch_all_tools(&store).await.unwrap().is_empty());

        let tools = create_tools(&store, ToolUpload::Bulk(vec![input("A"), input("B")]))
            .await
            .unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(fetch_all_tools(&store).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryStore::new();
        let tool = create_tools(&store, ToolUpload::Single(input("Draft")))
            .await
            .unwrap()
            .remove(0);

        let patch = ToolPatch {
            rating: Some(4.5),
            ..ToolPatch::default()
        };
        let updated = update_tool(&store, &tool.id, patch).await.unwrap();
        assert_eq!(updated.rating, Some(4.5));
        assert_eq!(updated.name, "Draft");

        assert!(matches!(
            update_tool(&store, &tool.id, ToolPatch::default()).await,
            Err(AppError::ValidationError(_))
        ));

        delete_tool(&store, &tool.id).await.unwrap();
        assert!(matches!(
            delete_tool(&store, &tool.id).await,
            Err(AppError::NotFoundError(_))
        ));
    }

    #[tokio::test]
    async fn test_approve_submission_publishes_tool() {
        let store = InMemoryStore::new();
        let row = json!({
            "name": "Scribe",
            "url": "https://scribe.example.com",
            "description": "Drafts long-form articles from outlines",
            "category": ["Writing"],
            "pricing": "Freemium",
            "submitter_email": "maker@example.com",
            "logo": "",
            "status": STATUS_PENDING,
        });
        let stored = store
            .insert_one(Table::Submissions, row.as_object().cloned().unwrap())
            .await
            .unwrap();
        let id = crate::store::row_id(&stored).unwrap();

        let pending = list_submissions(&store, Some(STATUS_PENDING)).await.unwrap();
        assert_eq!(pending.len(), 1);

        let tool = approve_submission(&store, &id).await.unwrap();
        assert_eq!(tool.name, "Scribe");
        assert_eq!(tool.pricing, Pricing::Freemium);
        assert_eq!(fetch_all_tools(&store).await.unwrap().len(), 1);

        assert!(list_submissions(&store, Some(STATUS_PENDING)).await.unwrap().is_empty());
        assert!(matches!(
            approve_submission(&store, &id).await,
            Err(AppError::ConflictError(_))
        ));
        assert!(matches!(
            approve_submission(&store, "missing").await,
            Err(AppError::NotFoundError(_))
        ));
    }
}
