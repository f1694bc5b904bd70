//! Behaviour of the listing pipeline and comparison set over a fixed
//! ten-tool collection.

use toolshelf::catalog::filter::{
    filter_tools, matches_category, matches_features, matches_min_rating, matches_pricing,
    matches_search,
};
use toolshelf::catalog::pagination::{page_links, total_pages};
use toolshelf::catalog::sort::sort_tools;
use toolshelf::catalog::{run, FilterCriteria, PageLink, PageTracker, Pricing, SortKey, Tool};
use toolshelf::Comparison;

fn tool(
    id: &str,
    category: &[&str],
    pricing: Pricing,
    rating: Option<f64>,
    features: &[&str],
) -> Tool {
    Tool {
        id: id.to_string(),
        name: format!("Tool {}", id),
        logo: String::new(),
        description: format!("Description of {}", id),
        short_description: String::new(),
        category: category.iter().map(|s| s.to_string()).collect(),
        pricing,
        rating,
        review_count: 0,
        features: features.iter().map(|s| s.to_string()).collect(),
        api_access: false,
        pros: None,
        cons: None,
        use_cases: None,
        url: format!("https://{}.example.com", id),
        created_at: None,
    }
}

fn fixture() -> Vec<Tool> {
    vec![
        tool("t1", &["Design"], Pricing::Free, Some(4.5), &["API", "Mobile"]),
        tool("t2", &["Design"], Pricing::Free, Some(3.8), &[]),
        tool("t3", &["Design"], Pricing::Paid, Some(4.9), &["API"]),
        tool("t4", &["Writing"], Pricing::Free, Some(4.2), &[]),
        tool("t5", &["Design", "Writing"], Pricing::Free, Some(4.0), &["API"]),
        tool("t6", &["Design"], Pricing::Free, None, &[]),
        tool("t7", &["Coding"], Pricing::Freemium, Some(4.5), &["Mobile"]),
        tool("t8", &[], Pricing::Free, Some(4.8), &[]),
        tool("t9", &["Design"], Pricing::Free, Some(4.5), &[]),
        tool("t10", &["Video"], Pricing::OpenSource, Some(2.0), &[]),
    ]
}

fn ids(tools: &[&Tool]) -> Vec<String> {
    tools.iter().map(|t| t.id.clone()).collect()
}

#[test]
fn test_filter_result_does_not_depend_on_predicate_order() {
    let tools = fixture();
    let criteria = FilterCriteria::new()
        .with_category("Design")
        .with_pricing(Pricing::Free)
        .with_min_rating(4.0);

    let combined = ids(&filter_tools(&tools, &criteria));
    assert_eq!(combined, vec!["t1", "t5", "t9"]);

    let reversed: Vec<String> = tools
        .iter()
        .filter(|t| matches_features(t, &criteria.features))
        .filter(|t| matches_min_rating(t, criteria.min_rating))
        .filter(|t| matches_pricing(t, &criteria))
        .filter(|t| matches_category(t, criteria.category.as_deref()))
        .filter(|t| matches_search(t, &criteria.search_term))
        .map(|t| t.id.clone())
        .collect();
    assert_eq!(reversed, combined);
}

#[test]
fn test_feature_filter_requires_every_feature() {
    let tools = fixture();
    let criteria = FilterCriteria::new().with_features(["API", "Mobile"]);
    assert_eq!(ids(&filter_tools(&tools, &criteria)), vec!["t1"]);

    let unknown = FilterCriteria::new().with_features(["Telepathy"]);
    assert!(filter_tools(&tools, &unknown).is_empty());
}

#[test]
fn test_rating_sort_is_stable_for_ties() {
    let tools = fixture();
    let mut all: Vec<&Tool> = tools.iter().collect();
    sort_tools(&mut all, SortKey::Rating);

    let order = ids(&all);
    assert_eq!(&order[..2], &["t3", "t8"]);
    // t1, t7 and t9 share 4.5 and keep their input order.
    assert_eq!(&order[2..5], &["t1", "t7", "t9"]);
    // The unrated tool sorts last.
    assert_eq!(order.last().map(String::as_str), Some("t6"));
}

#[test]
fn test_pagination_math() {
    assert_eq!(total_pages(37, 18), 3);
    assert_eq!(
        page_links(2, 10),
        vec![
            PageLink::Page(1),
            PageLink::Page(2),
            PageLink::Page(3),
            PageLink::Page(4),
            PageLink::EllipsisEnd,
            PageLink::Page(10),
        ]
    );
    assert_eq!(
        page_links(6, 10),
        vec![
            PageLink::Page(1),
            PageLink::EllipsisStart,
            PageLink::Page(5),
            PageLink::Page(6),
            PageLink::Page(7),
            PageLink::EllipsisEnd,
            PageLink::Page(10),
        ]
    );
}

#[test]
fn test_page_resets_only_when_criteria_change() {
    let mut tracker = PageTracker::new();
    let criteria = FilterCriteria::new().with_category("Design");
    tracker.observe(&criteria);
    tracker.go_to(3, 10);
    assert_eq!(tracker.current_page(), 3);

    // Re-fetching with identical criteria keeps the page.
    assert!(!tracker.observe(&criteria.clone()));
    assert_eq!(tracker.current_page(), 3);

    assert!(tracker.observe(&criteria.with_search("pen")));
    assert_eq!(tracker.current_page(), 1);
}

#[test]
fn test_clearing_filters_restores_the_full_collection() {
    let tools = fixture();
    let snapshot = tools.clone();

    let nothing = FilterCriteria::new()
        .with_category("Design")
        .with_pricing(Pricing::Paid)
        .with_min_rating(5.0)
        .with_features(["API"])
        .with_search("zzz");
    let empty = run(&tools, &nothing, 18, 1);
    assert!(empty.is_empty());
    assert!(empty.tools.is_empty());
    assert_eq!(empty.pagination.total_pages, 1);

    let cleared = filter_tools(&tools, &FilterCriteria::new());
    let cleared: Vec<Tool> = cleared.into_iter().cloned().collect();
    assert_eq!(cleared, snapshot);
    assert_eq!(tools, snapshot);
}

#[test]
fn test_comparison_replacement_keeps_position() {
    let tools = fixture();
    let mut comparison =
        Comparison::new(vec![tools[0].clone(), tools[1].clone(), tools[2].clone()]).unwrap();

    assert!(comparison.replace("t2", tools[3].clone()));
    assert_eq!(comparison.ids(), vec!["t1", "t4", "t3"]);

    assert!(!comparison.replace("missing", tools[4].clone()));
    assert_eq!(comparison.ids(), vec!["t1", "t4", "t3"]);
}

#[test]
fn test_missing_optional_lists_read_as_empty() {
    let tools = fixture();
    let t = &tools[0];
    assert!(t.pros().is_empty());
    assert!(t.cons().is_empty());
    assert!(t.use_cases().is_empty());

    let json = serde_json::to_value(t).unwrap();
    assert!(json["pros"].is_null());
}

#[test]
fn test_empty_category_tools_only_show_under_all() {
    let tools = fixture();
    let all = filter_tools(&tools, &FilterCriteria::new().with_category("All"));
    assert!(all.iter().any(|t| t.id == "t8"));

    for label in ["Design", "Writing", "Coding", "Video"] {
        let view = filter_tools(&tools, &FilterCriteria::new().with_category(label));
        assert!(view.iter().all(|t| t.id != "t8"));
    }
}

#[test]
fn test_empty_collection() {
    let view = run(&[], &FilterCriteria::new(), 18, 4);
    assert!(view.is_empty());
    assert_eq!(view.pagination.current_page, 1);
    assert_eq!(view.pagination.pages, vec![PageLink::Page(1)]);
}
