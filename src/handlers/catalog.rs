//! Catalog listing, category and detail endpoints.
//!
//! Every listing fetches the full collection and runs the synchronous
//! filter/sort/paginate pipeline over it.

use crate::catalog::types::parse_pricing_selection;
use crate::catalog::{category_index, run, CategoryCount, FilterCriteria, Pagination, Tool};
use crate::error::{AppError, Result};
use crate::services::tools::{fetch_all_tools, fetch_tool};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Raw query string of a listing. Parsed into `FilterCriteria` so bad
/// values come back as the service's own 400 body.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub pricing: Option<String>,
    /// Minimum rating.
    pub rating: Option<String>,
    /// Comma-separated; a tool must carry every one.
    pub features: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

impl CatalogQuery {
    pub fn criteria(&self) -> Result<FilterCriteria> {
        let mut criteria = FilterCriteria::new();

        if let Some(search) = &self.search {
            criteria = criteria.with_search(search.as_str());
        }
        if let Some(category) = self.category.as_deref().map(str::trim) {
            if !category.is_empty() {
                criteria = criteria.with_category(category);
            }
        }
        if let Some(pricing) = &self.pricing {
            criteria.pricing = parse_pricing_selection(pricing)
                .map_err(|e| AppError::ValidationError(e.to_string()))?;
        }
        if let Some(rating) = self.rating.as_deref().map(str::trim) {
            if !rating.is_empty() {
                let min: f64 = rating.parse().map_err(|_| {
                    AppError::ValidationError(format!("rating '{}' is not a number", rating))
                })?;
                if !min.is_finite() {
                    return Err(AppError::ValidationError(
                        "rating must be finite".to_string(),
                    ));
                }
                criteria = criteria.with_min_rating(min);
            }
        }
        if let Some(features) = &self.features {
            criteria = criteria.with_features(
                features
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty()),
            );
        }
        if let Some(sort) = self.sort.as_deref().map(str::trim) {
            if !sort.is_empty() {
                criteria = criteria.with_sort(sort.parse().map_err(AppError::ValidationError)?);
            }
        }
        Ok(criteria)
    }

    /// Requested page; absent means the first.
    pub fn page(&self) -> Result<usize> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(1),
            Some(page) => page.parse().map_err(|_| {
                AppError::ValidationError(format!("page '{}' is not a page number", page))
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub criteria: FilterCriteria,
    pub tools: Vec<Tool>,
    pub pagination: Pagination,
}

fn listing(tools: &[Tool], criteria: FilterCriteria, page_size: usize, page: usize) -> CatalogResponse {
    let view = run(tools, &criteria, page_size, page);
    metrics::histogram!("catalog_matches").record(view.total_matches() as f64);
    tracing::debug!(
        matches = view.total_matches(),
        page = view.pagination.current_page,
        "Catalog listing"
    );
    CatalogResponse {
        tools: view.tools.into_iter().cloned().collect(),
        pagination: view.pagination,
        criteria,
    }
}

/// GET /tools - filtered, sorted, paginated catalog
pub async fn list_tools_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>> {
    let start = Instant::now();
    metrics::counter!("catalog_requests_total").increment(1);

    let criteria = query.criteria()?;
    let page = query.page()?;
    let tools = fetch_all_tools(state.store.as_ref()).await?;
    let response = listing(&tools, criteria, state.config.page_size, page);

    metrics::histogram!("catalog_request_duration_seconds").record(start.elapsed().as_secs_f64());
    Ok(Json(response))
}

/// GET /tools/:id - one tool, 404 when it does not exist
pub async fn tool_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Tool>> {
    let tool = fetch_tool(state.store.as_ref(), &id).await?;
    Ok(Json(tool))
}

/// GET /categories - distinct labels with counts
pub async fn categories_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryCount>>> {
    let tools = fetch_all_tools(state.store.as_ref()).await?;
    Ok(Json(category_index(&tools)))
}

/// GET /categories/:name - the listing with the category fixed by the path
pub async fn category_tools_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>> {
    metrics::counter!("catalog_requests_total").increment(1);

    let criteria = query.criteria()?.with_category(name);
    let page = query.page()?;
    let tools = fetch_all_tools(state.store.as_ref()).await?;
    Ok(Json(listing(&tools, criteria, state.config.page_size, page)))
}
