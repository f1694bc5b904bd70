//! Side-by-side comparison of a handful of tools.

use crate::catalog::filter::matches_search;
use crate::catalog::Tool;
use serde::Serialize;
use thiserror::Error;

/// Most tools a comparison can hold.
pub const MAX_COMPARED: usize = 4;

/// Related tools appended when only one tool is being compared.
pub const RELATED_SUGGESTIONS: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("at least one tool is required for a comparison")]
    Empty,

    #[error("at most {MAX_COMPARED} tools can be compared, got {0}")]
    TooMany(usize),
}

/// An ordered set of compared tools. Positions are stable across replacements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    tools: Vec<Tool>,
}

impl Comparison {
    /// Builds a comparison, dropping repeated ids (first occurrence wins).
    pub fn new(tools: Vec<Tool>) -> Result<Self, ComparisonError> {
        let mut unique: Vec<Tool> = Vec::with_capacity(tools.len());
        for tool in tools {
            if !unique.iter().any(|t| t.id == tool.id) {
                unique.push(tool);
            }
        }

        if unique.is_empty() {
            return Err(ComparisonError::Empty);
        }
        if unique.len() > MAX_COMPARED {
            return Err(ComparisonError::TooMany(unique.len()));
        }
        Ok(Self { tools: unique })
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn into_tools(self) -> Vec<Tool> {
        self.tools
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tools.iter().any(|t| t.id == id)
    }

    /// Swaps the tool with `old_id` for `replacement` at the same index.
    ///
    /// Returns false and leaves the comparison untouched when `old_id` is not
    /// compared, or when `replacement` already sits at another position.
    pub fn replace(&mut self, old_id: &str, replacement: Tool) -> bool {
        let Some(index) = self.tools.iter().position(|t| t.id == old_id) else {
            return false;
        };
        let duplicate = self
            .tools
            .iter()
            .enumerate()
            .any(|(i, t)| i != index && t.id == replacement.id);
        if duplicate {
            return false;
        }
        self.tools[index] = replacement;
        true
    }

    /// Tools offered as a replacement for `replacing`.
    ///
    /// Excludes every compared tool except the one being replaced, so that
    /// picking it again is a valid "cancel". An optional search term narrows
    /// the list the same way the catalog search does.
    pub fn replacement_candidates<'a>(
        &self,
        catalog: &'a [Tool],
        replacing: &str,
        search: &str,
    ) -> Vec<&'a Tool> {
        catalog
            .iter()
            .filter(|t| t.id == replacing || !self.contains(&t.id))
            .filter(|t| matches_search(t, search))
            .collect()
    }

    /// With a single compared tool, appends up to two catalog tools sharing
    /// at least one category with it. Larger comparisons are returned as is.
    pub fn with_related(mut self, catalog: &[Tool]) -> Self {
        if self.tools.len() != 1 {
            return self;
        }
        let anchor = self.tools[0].clone();
        let related: Vec<Tool> = catalog
            .iter()
            .filter(|t| t.id != anchor.id && anchor.shares_category_with(t))
            .take(RELATED_SUGGESTIONS)
            .cloned()
            .collect();
        self.tools.extend(related);
        self
    }
}
