//! User-facing search facade over the fragment graph.
//!
//! [`QuickSearch`] owns a [`FragmentGraph`] and the keyword-preparation
//! pipeline around it: free-form item keywords and query input are run
//! through a pluggable extractor and normalizer before they touch the
//! engine, short registration keywords are dropped, and query results are
//! ranked by a pluggable match scorer.
//!
//! Multi-keyword queries intersect: an item must match every prepared query
//! keyword, and its final score is the sum of its best per-keyword scores.
//! A query keyword with no entry node backtracks by dropping its last
//! character until something matches, so `termite` still finds an item
//! keyed under `terminator`.
//!
//! ```
//! use quicksearch::search::QuickSearch;
//!
//! let qs: QuickSearch<&str> = QuickSearch::new();
//! qs.add_item("Villain", "Roy Batty Lord Voldemort Colonel Kurtz");
//! qs.add_item("Hero", "Walt Kowalski Jake Blues Shaun");
//! assert_eq!(qs.find_item("walk"), Some("Hero"));
//! ```

/// Result types: scored items and the augmented search response.
pub mod types;

pub use types::{ScoredItem, SearchResponse};

use crate::config;
use crate::graph::{FragmentGraph, GraphStats};
use crate::scorer;
use crate::tokenizer;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::Hash;
use thiserror::Error;

/// Splits raw input into candidate keywords.
pub type KeywordsExtractor = Box<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// Folds a candidate keyword into its canonical stored form. Returning an
/// empty string drops the keyword.
pub type KeywordNormalizer = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Scores a query fragment against a matched keyword. Results at or below
/// zero discard the match.
pub type MatchScorer = Box<dyn Fn(&str, &str) -> f64 + Send + Sync>;

/// Configuration error from [`Builder::build`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// The minimum keyword length must allow at least one character.
    #[error("minimum keyword length must be at least 1, got {0}")]
    MinimumKeywordLength(usize),
}

/// Configures and builds a [`QuickSearch`] instance.
pub struct Builder {
    extractor: KeywordsExtractor,
    normalizer: KeywordNormalizer,
    scorer: MatchScorer,
    minimum_keyword_length: usize,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Starts from the defaults: non-alphanumeric split extraction,
    /// lowercasing normalization, the ratio-with-prefix-bonus scorer, and
    /// a minimum registration keyword length of two.
    pub fn new() -> Self {
        Self {
            extractor: Box::new(tokenizer::extract_keywords),
            normalizer: Box::new(tokenizer::normalize_keyword),
            scorer: Box::new(scorer::ratio_match_score),
            minimum_keyword_length: config::DEFAULT_MINIMUM_KEYWORD_LENGTH,
        }
    }

    /// Replace the keywords extractor.
    pub fn keywords_extractor(
        mut self,
        extractor: impl Fn(&str) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Replace the keyword normalizer.
    pub fn keyword_normalizer(
        mut self,
        normalizer: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    /// Replace the match scorer.
    pub fn match_scorer(
        mut self,
        scorer: impl Fn(&str, &str) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    /// Set the minimum length for registration keywords. Shorter keywords
    /// are dropped when items are added; query input is unaffected.
    pub fn minimum_keyword_length(mut self, length: usize) -> Self {
        self.minimum_keyword_length = length;
        self
    }

    /// Build the search instance.
    pub fn build<T: Clone + Eq + Hash>(self) -> Result<QuickSearch<T>, BuildError> {
        if self.minimum_keyword_length < 1 {
            return Err(BuildError::MinimumKeywordLength(self.minimum_keyword_length));
        }
        Ok(QuickSearch {
            graph: FragmentGraph::new(),
            extractor: self.extractor,
            normalizer: self.normalizer,
            scorer: self.scorer,
            minimum_keyword_length: self.minimum_keyword_length,
        })
    }
}

/// In-memory quick-search over items registered with free-form keywords.
///
/// Thread safe: mutations and queries may run concurrently from any number
/// of threads; share an instance behind `Arc` or clone the underlying
/// [`FragmentGraph`] handle via [`QuickSearch::graph`].
pub struct QuickSearch<T> {
    graph: FragmentGraph<T>,
    extractor: KeywordsExtractor,
    normalizer: KeywordNormalizer,
    scorer: MatchScorer,
    minimum_keyword_length: usize,
}

impl<T: Clone + Eq + Hash> Default for QuickSearch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> QuickSearch<T> {
    /// Creates an instance with default extraction, normalization, scoring,
    /// and minimum keyword length.
    pub fn new() -> Self {
        Self {
            graph: FragmentGraph::new(),
            extractor: Box::new(tokenizer::extract_keywords),
            normalizer: Box::new(tokenizer::normalize_keyword),
            scorer: Box::new(scorer::ratio_match_score),
            minimum_keyword_length: config::DEFAULT_MINIMUM_KEYWORD_LENGTH,
        }
    }

    /// Starts a [`Builder`] for custom configuration.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// The underlying graph engine.
    pub fn graph(&self) -> &FragmentGraph<T> {
        &self.graph
    }

    /// Add an item under the keywords extracted from `keywords`, free-form
    /// text like `"Shoe Red 10 Converse cheap"`.
    ///
    /// Adding an existing item extends its keyword set. Returns `false`
    /// when no usable keywords survive preparation (the item is not added).
    pub fn add_item(&self, item: T, keywords: &str) -> bool {
        let prepared = self.prepare_keywords(keywords, true);
        if prepared.is_empty() {
            return false;
        }
        let refs: Vec<&str> = prepared.iter().map(String::as_str).collect();
        self.graph.register(item, &refs);
        true
    }

    /// Remove a previously added item and any graph structure only it was
    /// holding up. Returns `false` when the item was never added.
    pub fn remove_item(&self, item: &T) -> bool {
        self.graph.deregister(item)
    }

    /// The top-scoring item for `query`, if anything matches.
    pub fn find_item(&self, query: &str) -> Option<T> {
        self.find_items(query, 1).into_iter().next()
    }

    /// Up to `limit` items matching `query`, best first.
    pub fn find_items(&self, query: &str, limit: usize) -> Vec<T> {
        self.search_scored(query, limit)
            .items
            .into_iter()
            .map(|scored| scored.item)
            .collect()
    }

    /// Like [`QuickSearch::find_item`], wrapped in the augmented response.
    pub fn find_item_detailed(&self, query: &str) -> SearchResponse<T> {
        self.search_scored(query, 1)
    }

    /// Like [`QuickSearch::find_items`], with scores, per-item keyword
    /// sets, and the prepared query keywords.
    pub fn find_items_detailed(&self, query: &str, limit: usize) -> SearchResponse<T> {
        self.search_scored(query, limit)
    }

    /// The keywords `item` is registered under, sorted. Empty for unknown
    /// items.
    pub fn keywords_of(&self, item: &T) -> Vec<String> {
        let mut keywords: Vec<String> = self
            .graph
            .keywords_of(item)
            .iter()
            .map(|k| k.to_string())
            .collect();
        keywords.sort();
        keywords
    }

    /// Drop all items and graph structure.
    pub fn clear(&self) {
        self.graph.clear();
    }

    /// Lock-free snapshot of (registered items, live fragments).
    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    /// Extract, normalize, de-duplicate; optionally drop keywords shorter
    /// than the configured minimum (registration path only). Post-trim
    /// empties never reach the engine.
    fn prepare_keywords(&self, raw: &str, filter_short: bool) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut prepared = Vec::new();
        for candidate in (self.extractor)(raw) {
            if candidate.is_empty() {
                continue;
            }
            let keyword = (self.normalizer)(&candidate).trim().to_string();
            if keyword.is_empty() {
                continue;
            }
            if filter_short && keyword.chars().count() < self.minimum_keyword_length {
                continue;
            }
            if seen.insert(keyword.clone()) {
                prepared.push(keyword);
            }
        }
        prepared
    }

    /// Walk one query keyword, backtracking by dropping the last character
    /// while the fragment has no entry node.
    fn match_keyword(&self, keyword: &str) -> HashMap<T, f64> {
        let mut fragment = keyword;
        loop {
            if self.graph.contains_fragment(fragment) {
                return self
                    .graph
                    .walk_and_score(fragment, |query, matched| (self.scorer)(query, matched));
            }
            match drop_last_char(fragment) {
                Some(shorter) => fragment = shorter,
                None => return HashMap::new(),
            }
        }
    }

    fn search_scored(&self, query: &str, limit: usize) -> SearchResponse<T> {
        let query_keywords = self.prepare_keywords(query, false);
        let mut response = SearchResponse::new(query.to_string(), query_keywords, Vec::new());
        if response.query_keywords.is_empty() || limit == 0 {
            return response;
        }

        // Intersect across query keywords, summing the per-keyword scores
        // of surviving items.
        let mut merged: Option<HashMap<T, f64>> = None;
        for keyword in &response.query_keywords {
            let matches = self.match_keyword(keyword);
            merged = Some(match merged.take() {
                None => matches,
                Some(seen) => {
                    let mut intersection = HashMap::with_capacity(seen.len().min(matches.len()));
                    for (item, score) in matches {
                        if let Some(previous) = seen.get(&item) {
                            intersection.insert(item, previous + score);
                        }
                    }
                    intersection
                }
            });
            if merged.as_ref().is_some_and(HashMap::is_empty) {
                break;
            }
        }
        let scored: Vec<(T, f64)> = merged.unwrap_or_default().into_iter().collect();

        // Partial sort: O(n log k) via min-heap of size k
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, usize)>> =
            BinaryHeap::with_capacity(limit + 1);
        for (idx, &(_, score)) in scored.iter().enumerate() {
            heap.push(Reverse((OrderedFloat(score), idx)));
            if heap.len() > limit {
                heap.pop();
            }
        }
        let mut top: Vec<(usize, f64)> = heap
            .into_iter()
            .map(|Reverse((score, idx))| (idx, score.0))
            .collect();
        top.sort_unstable_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        response.items = top
            .into_iter()
            .map(|(idx, score)| {
                let item = scored[idx].0.clone();
                let keywords = self.keywords_of(&item);
                ScoredItem {
                    item,
                    score,
                    keywords,
                }
            })
            .collect();
        response
    }
}

/// The fragment minus its last character; `None` once nothing would remain.
fn drop_last_char(fragment: &str) -> Option<&str> {
    let last = fragment.chars().next_back()?;
    let shorter = &fragment[..fragment.len() - last.len_utf8()];
    (!shorter.is_empty()).then_some(shorter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_zero_minimum_length() {
        let result = Builder::new().minimum_keyword_length(0).build::<String>();
        assert!(matches!(result, Err(BuildError::MinimumKeywordLength(0))));
    }

    #[test]
    fn test_add_item_without_usable_keywords() {
        let qs: QuickSearch<&str> = QuickSearch::new();
        assert!(!qs.add_item("A", ""));
        assert!(!qs.add_item("A", "!!! --- ***"));
        // single chars fall under the default minimum length of 2
        assert!(!qs.add_item("A", "a b c"));
        assert_eq!(qs.stats().items, 0);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let qs: QuickSearch<&str> = QuickSearch::new();
        assert!(qs.add_item("A", "New York"));
        assert_eq!(qs.find_item("YORK"), Some("A"));
        assert_eq!(qs.find_item("new"), Some("A"));
    }

    #[test]
    fn test_readding_extends_keywords() {
        let qs: QuickSearch<&str> = QuickSearch::new();
        qs.add_item("A", "red");
        qs.add_item("A", "shoe");
        assert_eq!(qs.keywords_of(&"A"), vec!["red", "shoe"]);
        assert_eq!(qs.find_item("red"), Some("A"));
        assert_eq!(qs.find_item("shoe"), Some("A"));
    }

    #[test]
    fn test_custom_scorer_and_minimum_length() {
        let qs: QuickSearch<&str> = QuickSearch::<&str>::builder()
            .match_scorer(crate::scorer::length_match_score)
            .minimum_keyword_length(4)
            .build()
            .unwrap();
        assert!(qs.add_item("A", "one terminator"));
        // "one" was dropped by the minimum length
        assert_eq!(qs.keywords_of(&"A"), vec!["terminator"]);
        assert_eq!(qs.find_item("term"), Some("A"));
        let detailed = qs.find_item_detailed("term");
        assert_eq!(detailed.items[0].score, 8.0);
    }

    #[test]
    fn test_drop_last_char() {
        assert_eq!(drop_last_char("abc"), Some("ab"));
        assert_eq!(drop_last_char("a"), None);
        assert_eq!(drop_last_char(""), None);
        assert_eq!(drop_last_char("aé"), Some("a"));
    }

    #[test]
    fn test_limit_zero_returns_nothing() {
        let qs: QuickSearch<&str> = QuickSearch::new();
        qs.add_item("A", "apple");
        assert!(qs.find_items("app", 0).is_empty());
    }

    #[test]
    fn test_remove_item_reports_presence() {
        let qs: QuickSearch<&str> = QuickSearch::new();
        qs.add_item("A", "apple");
        assert!(qs.remove_item(&"A"));
        assert!(!qs.remove_item(&"A"));
        assert_eq!(qs.stats().items, 0);
    }
}
