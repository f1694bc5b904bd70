//! Filtering stage of the catalog pipeline.
//!
//! All predicates are AND-combined and pure, so the order they run in only
//! matters for readability. The input slice is never modified.

use crate::catalog::types::{FilterCriteria, Tool};

/// Case-insensitive substring match on name, description or any category label.
/// A blank term matches everything.
pub fn matches_search(tool: &Tool, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    tool.name.to_lowercase().contains(&needle)
        || tool.description.to_lowercase().contains(&needle)
        || tool
            .category
            .iter()
            .any(|c| c.to_lowercase().contains(&needle))
}

pub fn matches_category(tool: &Tool, category: Option<&str>) -> bool {
    match category {
        Some(label) => tool.in_category(label),
        None => true,
    }
}

pub fn matches_pricing(tool: &Tool, criteria: &FilterCriteria) -> bool {
    criteria.pricing.map_or(true, |p| tool.pricing == p)
}

/// Inclusive threshold. A tool without a rating never passes an active threshold.
pub fn matches_min_rating(tool: &Tool, min_rating: Option<f64>) -> bool {
    match min_rating {
        Some(threshold) => tool.rating.is_some_and(|r| r >= threshold),
        None => true,
    }
}

/// Every required feature must be present on the tool.
pub fn matches_features(tool: &Tool, required: &[String]) -> bool {
    required.iter().all(|f| tool.has_feature(f))
}

pub fn matches(tool: &Tool, criteria: &FilterCriteria) -> bool {
    matches_search(tool, &criteria.search_term)
        && matches_category(tool, criteria.category.as_deref())
        && matches_pricing(tool, criteria)
        && matches_min_rating(tool, criteria.min_rating)
        && matches_features(tool, &criteria.features)
}

/// Returns the tools satisfying every criterion, in input order.
pub fn filter_tools<'a>(tools: &'a [Tool], criteria: &FilterCriteria) -> Vec<&'a Tool> {
    tools.iter().filter(|t| matches(t, criteria)).collect()
}
