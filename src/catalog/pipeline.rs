//! Filter → sort → paginate over an in-memory tool collection.

use crate::catalog::filter::filter_tools;
use crate::catalog::pagination::{page_slice, Pagination};
use crate::catalog::sort::sort_tools;
use crate::catalog::types::{FilterCriteria, Tool};
use serde::Serialize;

/// Result of one pipeline run. Borrows from the source collection.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView<'a> {
    /// Every matching tool, in display order.
    #[serde(skip)]
    pub matches: Vec<&'a Tool>,
    /// The tools on the current page.
    pub tools: Vec<&'a Tool>,
    pub pagination: Pagination,
}

impl CatalogView<'_> {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn total_matches(&self) -> usize {
        self.matches.len()
    }
}

/// Runs the full pipeline. `page` is 1-based and clamped to the available pages.
pub fn run<'a>(
    tools: &'a [Tool],
    criteria: &FilterCriteria,
    page_size: usize,
    page: usize,
) -> CatalogView<'a> {
    let mut matches = filter_tools(tools, criteria);
    sort_tools(&mut matches, criteria.sort_by);

    let pagination = Pagination::new(matches.len(), page_size, page);
    let tools = page_slice(&matches, pagination.current_page, page_size).to_vec();

    CatalogView {
        matches,
        tools,
        pagination,
    }
}
