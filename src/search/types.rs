//! Result types for the search facade.

use serde::Serialize;
use std::sync::OnceLock;

/// An item matched by a query, with its accumulated score and the full
/// keyword set it is registered under.
///
/// The keyword set covers *all* of the item's registered keywords, not just
/// the ones the query matched. Callers use it to explain results or to
/// suggest query refinements.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem<T> {
    /// The matched item.
    pub item: T,
    /// Accumulated relevance score (sum over query keywords of the best
    /// per-walk score). Higher is better; semantics follow the configured
    /// scorer.
    pub score: f64,
    /// All keywords the item is registered under, sorted.
    pub keywords: Vec<String>,
}

/// A query's full result: the raw input, the prepared keywords actually
/// searched, and the ranked matches.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse<T> {
    /// The raw search string as supplied.
    pub query: String,
    /// Keywords extracted and normalized from the query.
    pub query_keywords: Vec<String>,
    /// Matched items, ordered by descending score.
    pub items: Vec<ScoredItem<T>>,
    #[serde(skip)]
    intersecting: OnceLock<Vec<String>>,
}

impl<T> SearchResponse<T> {
    pub(crate) fn new(
        query: String,
        query_keywords: Vec<String>,
        items: Vec<ScoredItem<T>>,
    ) -> Self {
        Self {
            query,
            query_keywords,
            items,
            intersecting: OnceLock::new(),
        }
    }

    /// Keywords shared by every matched item, sorted.
    ///
    /// Useful for hinting: any of these can be appended to the query
    /// without narrowing the result set further. Empty when there are no
    /// matches. Computed lazily on first call and cached for the life of
    /// the response.
    pub fn intersecting_keywords(&self) -> &[String] {
        self.intersecting.get_or_init(|| {
            let mut items = self.items.iter();
            let Some(first) = items.next() else {
                return Vec::new();
            };
            let mut shared = first.keywords.clone();
            for item in items {
                shared.retain(|keyword| item.keywords.contains(keyword));
            }
            shared.sort();
            shared
        })
    }
}
