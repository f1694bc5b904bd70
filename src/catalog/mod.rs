//! The catalog listing pipeline.
//!
//! Pure, synchronous transformations over an in-memory `Tool` collection.
//! Data fetching lives in `services`.

pub mod filter;
pub mod pagination;
pub mod pipeline;
pub mod sort;
pub mod types;

pub use pagination::{PageLink, PageTracker, Pagination, DEFAULT_PAGE_SIZE};
pub use pipeline::{run, CatalogView};
pub use types::{FilterCriteria, Pricing, SortKey, Tool, ALL};

use serde::Serialize;
use std::collections::BTreeMap;

/// A category label and how many tools carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Distinct category labels across the collection, sorted by label.
pub fn category_index(tools: &[Tool]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tool in tools {
        for label in &tool.category {
            *counts.entry(label.as_str()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
        })
        .collect()
}
