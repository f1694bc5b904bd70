//! Core catalog types: the `Tool` entity and the criteria the pipeline consumes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel used by clients for "no category / pricing restriction".
pub const ALL: &str = "All";

/// Upper bound of the rating scale.
pub const MAX_RATING: f64 = 5.0;

/// Commercial model of a listed tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pricing {
    #[serde(rename = "Free")]
    Free,
    #[serde(rename = "Freemium")]
    Freemium,
    #[serde(rename = "Paid")]
    Paid,
    #[serde(rename = "Free Trial")]
    FreeTrial,
    #[serde(rename = "Open Source")]
    OpenSource,
    #[serde(rename = "Contact for Pricing")]
    ContactForPricing,
}

impl Pricing {
    pub const ALL_TIERS: [Pricing; 6] = [
        Pricing::Free,
        Pricing::Freemium,
        Pricing::Paid,
        Pricing::FreeTrial,
        Pricing::OpenSource,
        Pricing::ContactForPricing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Pricing::Free => "Free",
            Pricing::Freemium => "Freemium",
            Pricing::Paid => "Paid",
            Pricing::FreeTrial => "Free Trial",
            Pricing::OpenSource => "Open Source",
            Pricing::ContactForPricing => "Contact for Pricing",
        }
    }
}

impl fmt::Display for Pricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPricing(pub String);

impl fmt::Display for UnknownPricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pricing label '{}'", self.0)
    }
}

impl std::error::Error for UnknownPricing {}

impl FromStr for Pricing {
    type Err = UnknownPricing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pricing::ALL_TIERS
            .iter()
            .find(|tier| tier.label() == s)
            .copied()
            .ok_or_else(|| UnknownPricing(s.to_string()))
    }
}

/// A catalog entry for one third-party AI product.
///
/// `pros`, `cons` and `use_cases` keep the distinction between "absent" and
/// "empty"; use the accessor methods when reading them for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub description: String,
    pub short_description: String,
    pub category: Vec<String>,
    pub pricing: Pricing,
    pub rating: Option<f64>,
    pub review_count: u64,
    pub features: Vec<String>,
    pub api_access: bool,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
    pub use_cases: Option<Vec<String>>,
    pub url: String,
    pub created_at: Option<i64>,
}

impl Tool {
    pub fn pros(&self) -> &[String] {
        self.pros.as_deref().unwrap_or(&[])
    }

    pub fn cons(&self) -> &[String] {
        self.cons.as_deref().unwrap_or(&[])
    }

    pub fn use_cases(&self) -> &[String] {
        self.use_cases.as_deref().unwrap_or(&[])
    }

    pub fn in_category(&self, label: &str) -> bool {
        self.category.iter().any(|c| c == label)
    }

    pub fn has_feature(&self, label: &str) -> bool {
        self.features.iter().any(|f| f == label)
    }

    pub fn shares_category_with(&self, other: &Tool) -> bool {
        self.category.iter().any(|c| other.in_category(c))
    }
}

/// The single active ordering of a catalog listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Rating,
    ReviewCount,
    Newest,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(SortKey::Rating),
            "reviewCount" | "review_count" | "reviews" => Ok(SortKey::ReviewCount),
            "newest" => Ok(SortKey::Newest),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

/// User-selected search, filter and sort parameters for one listing.
///
/// `category: None` and `pricing: None` mean "All".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub category: Option<String>,
    pub pricing: Option<Pricing>,
    pub min_rating: Option<f64>,
    pub features: Vec<String>,
    pub sort_by: SortKey,
    pub search_term: String,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the category, treating the "All" sentinel as no restriction.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (category != ALL).then_some(category);
        self
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sort(mut self, sort_by: SortKey) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }
}

/// Parses a pricing selection, where "All" (or an empty value) means no restriction.
pub fn parse_pricing_selection(value: &str) -> Result<Option<Pricing>, UnknownPricing> {
    let value = value.trim();
    if value.is_empty() || value == ALL {
        return Ok(None);
    }
    value.parse().map(Some)
}
