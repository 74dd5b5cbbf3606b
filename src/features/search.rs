//! Dog search and recent-search suggestions.
//!
//! Suggestions fuzzy-match the typed input against recent searches with the
//! skim algorithm and report which characters matched so the UI can bold them.

use crate::api::{notify_failure, ApiClient};
use crate::domain::error::{PawfeedError, Result};
use crate::domain::Dog;
use crate::storage::ClientStorage;
use crate::ui::Toasts;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::sync::Arc;

pub const MIN_QUERY_LEN: usize = 2;

/// A recent search matching the current input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub score: i64,
    /// Matched character ranges as `(start, end)` char indices, end exclusive.
    pub highlights: Vec<(usize, usize)>,
}

/// # Errors
///
/// Returns [`PawfeedError::Validation`] for queries shorter than
/// [`MIN_QUERY_LEN`] characters after trimming.
pub fn validate_query(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Err(PawfeedError::Validation(format!(
            "Type at least {MIN_QUERY_LEN} characters to search"
        )));
    }
    Ok(query)
}

/// Collapses matched indices into contiguous ranges.
fn highlight_ranges(indices: &[usize]) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &idx in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end == idx => *end = idx + 1,
            _ => ranges.push((idx, idx + 1)),
        }
    }
    ranges
}

#[derive(Debug, Clone)]
pub struct SearchService {
    api: ApiClient,
    storage: Arc<ClientStorage>,
    toasts: Toasts,
}

impl SearchService {
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<ClientStorage>, toasts: Toasts) -> Self {
        Self { api, storage, toasts }
    }

    /// Searches dogs by name or breed and records the query.
    ///
    /// # Errors
    ///
    /// Validation or API failures, also shown as a toast.
    pub async fn search(&self, query: &str) -> Result<Vec<Dog>> {
        let result = match validate_query(query) {
            Ok(query) => self.run(query).await,
            Err(e) => Err(e),
        };
        notify_failure(&self.toasts, "Search failed", result)
    }

    async fn run(&self, query: &str) -> Result<Vec<Dog>> {
        let encoded: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", query)
            .finish();
        let dogs: Vec<Dog> = self.api.get(&format!("/dogs/search?{encoded}")).await?;

        self.storage.push_recent_search(query)?;
        tracing::debug!(query, results = dogs.len(), "search completed");
        Ok(dogs)
    }

    /// Recent searches matching `input`, best first.
    ///
    /// Empty input returns every recent search in recency order.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn suggestions(&self, input: &str) -> Result<Vec<Suggestion>> {
        let recent = self.storage.recent_searches()?;
        let input = input.trim();

        if input.is_empty() {
            return Ok(recent
                .into_iter()
                .map(|text| Suggestion {
                    text,
                    score: 0,
                    highlights: Vec::new(),
                })
                .collect());
        }

        let matcher = SkimMatcherV2::default().ignore_case();
        let mut suggestions: Vec<Suggestion> = recent
            .into_iter()
            .filter_map(|text| {
                let (score, indices) = matcher.fuzzy_indices(&text, input)?;
                Some(Suggestion {
                    highlights: highlight_ranges(&indices),
                    text,
                    score,
                })
            })
            .collect();

        // Stable sort keeps recency order among equal scores.
        suggestions.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_indices_merge_into_one_range() {
        assert_eq!(highlight_ranges(&[0, 1, 2, 5, 7, 8]), vec![(0, 3), (5, 6), (7, 9)]);
        assert!(highlight_ranges(&[]).is_empty());
    }

    #[test]
    fn short_queries_are_rejected_after_trimming() {
        assert!(validate_query(" a ").is_err());
        assert_eq!(validate_query("  lab ").unwrap(), "lab");
    }
}
