use super::split_ids;
use crate::catalog::Tool;
use crate::compare::Comparison;
use crate::error::{AppError, Result};
use crate::services::tools::{fetch_all_tools, fetch_tool, fetch_tools_by_ids};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    #[serde(default)]
    pub ids: String,
}

#[derive(Debug, Deserialize)]
pub struct CandidatesQuery {
    #[serde(default)]
    pub ids: String,
    pub replacing: String,
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceRequest {
    pub ids: Vec<String>,
    pub old_id: String,
    pub new_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResponse {
    /// Ids of the compared tools, in position order.
    pub ids: Vec<String>,
    /// Compared tools, followed by related suggestions for a single tool.
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced: Option<bool>,
}

async fn load_comparison(state: &AppState, ids: &[String]) -> Result<Comparison> {
    let tools = fetch_tools_by_ids(state.store.as_ref(), ids).await?;
    Ok(Comparison::new(tools)?)
}

fn owned_ids(comparison: &Comparison) -> Vec<String> {
    comparison.ids().into_iter().map(String::from).collect()
}

/// GET /compare?ids=a,b - side-by-side view of up to four tools
pub async fn compare_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ComparisonResponse>> {
    let comparison = load_comparison(&state, &split_ids(&query.ids)).await?;
    let ids = owned_ids(&comparison);

    let comparison = if comparison.tools().len() == 1 {
        let catalog = fetch_all_tools(state.store.as_ref()).await?;
        comparison.with_related(&catalog)
    } else {
        comparison
    };

    Ok(Json(ComparisonResponse {
        ids,
        tools: comparison.into_tools(),
        replaced: None,
    }))
}

/// GET /compare/candidates - tools that may take the place of `replacing`
pub async fn candidates_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CandidatesQuery>,
) -> Result<Json<Vec<Tool>>> {
    let comparison = load_comparison(&state, &split_ids(&query.ids)).await?;
    if !comparison.contains(&query.replacing) {
        return Err(AppError::ValidationError(format!(
            "'{}' is not part of the comparison",
            query.replacing
        )));
    }

    let catalog = fetch_all_tools(state.store.as_ref()).await?;
    let candidates = comparison
        .replacement_candidates(&catalog, &query.replacing, &query.search)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(candidates))
}

/// POST /compare/replace - swap one compared tool for another in place
///
/// The replacement is fetched before anything changes, so an unknown
/// `newId` is a 404 and nothing is swapped.
pub async fn replace_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReplaceRequest>,
) -> Result<Json<ComparisonResponse>> {
    let mut comparison = load_comparison(&state, &request.ids).await?;
    let replacement = fetch_tool(state.store.as_ref(), &request.new_id).await?;

    let replaced = comparison.replace(&request.old_id, replacement);
    if !replaced {
        tracing::debug!(
            old_id = %request.old_id,
            new_id = %request.new_id,
            "Replacement left the comparison unchanged"
        );
    }

    Ok(Json(ComparisonResponse {
        ids: owned_ids(&comparison),
        tools: comparison.into_tools(),
        replaced: Some(replaced),
    }))
}
