//! Admin-only endpoints. Every handler checks the caller against the
//! allow-list before touching the store.

use super::current_session;
use crate::catalog::Tool;
use crate::error::Result;
use crate::forms::ToolPatch;
use crate::services::admin::{self, Submission, ToolUpload};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct SubmissionsQuery {
    pub status: Option<String>,
}

async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let session = current_session(state, headers)?;
    admin::require_admin(state.store.as_ref(), &session.user).await
}

/// POST /admin/tools - one tool object or an array of them
pub async fn create_tools_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(upload): Json<ToolUpload>,
) -> Result<(StatusCode, Json<Vec<Tool>>)> {
    require_admin(&state, &headers).await?;
    let tools = admin::create_tools(state.store.as_ref(), upload).await?;
    Ok((StatusCode::CREATED, Json(tools)))
}

/// PUT /admin/tools/:id
pub async fn update_tool_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<ToolPatch>,
) -> Result<Json<Tool>> {
    require_admin(&state, &headers).await?;
    Ok(Json(admin::update_tool(state.store.as_ref(), &id, patch).await?))
}

/// DELETE /admin/tools/:id
pub async fn delete_tool_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    require_admin(&state, &headers).await?;
    admin::delete_tool(state.store.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/submissions?status=pending
pub async fn submissions_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SubmissionsQuery>,
) -> Result<Json<Vec<Submission>>> {
    require_admin(&state, &headers).await?;
    let submissions =
        admin::list_submissions(state.store.as_ref(), query.status.as_deref()).await?;
    Ok(Json(submissions))
}

/// POST /admin/submissions/:id/approve
pub async fn approve_submission_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Tool>)> {
    require_admin(&state, &headers).await?;
    let tool = admin::approve_submission(state.store.as_ref(), &id).await?;
    Ok((StatusCode::CREATED, Json(tool)))
}
