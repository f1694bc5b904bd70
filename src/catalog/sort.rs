//! Sorting stage of the catalog pipeline.

use crate::catalog::types::{SortKey, Tool};
use std::cmp::Ordering;

/// Creation timestamp used for "newest"; zero counts as missing.
fn created_key(tool: &Tool) -> Option<i64> {
    tool.created_at.filter(|&ts| ts > 0)
}

/// Descending comparison for the given key. `None` values order last.
pub fn compare(a: &Tool, b: &Tool, key: SortKey) -> Ordering {
    match key {
        SortKey::Rating => b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal),
        SortKey::ReviewCount => b.review_count.cmp(&a.review_count),
        SortKey::Newest => created_key(b).cmp(&created_key(a)),
    }
}

/// Stable in-place sort; tools comparing equal keep their relative order.
pub fn sort_tools(tools: &mut [&Tool], key: SortKey) {
    tools.sort_by(|a, b| compare(a, b, key));
}
