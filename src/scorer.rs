//! Match scorers for query fragments against matched keywords.
//!
//! A scorer is any `Fn(&str, &str) -> f64` taking the (possibly partial)
//! query fragment and the full matching keyword. Higher means a closer
//! match; scores at or below zero discard the match. These two cover the
//! common cases; callers with domain-specific relevance plug their own in
//! through the search builder.

use crate::config;

/// Default scorer: ratio between query and keyword character counts, with
/// a flat bonus when the keyword starts with the query fragment.
///
/// Against the keyword `password`:
/// - `pa` scores 0.25, boosted to 1.25 for matching the start
/// - `swo` scores 0.375, no boost
/// - `assword` scores 0.875, no boost
/// - `password` scores 1.0, boosted to 2.0
pub fn ratio_match_score(query: &str, keyword: &str) -> f64 {
    let mut score = query.chars().count() as f64 / keyword.chars().count() as f64;

    if keyword.starts_with(query) {
        score += config::PREFIX_MATCH_BONUS;
    }

    score
}

/// Alternative scorer that strongly prefers longer matches: the query's
/// character count, doubled when it matches the start of the keyword.
pub fn length_match_score(query: &str, keyword: &str) -> f64 {
    let mut score = query.chars().count() as f64;

    if keyword.starts_with(query) {
        score *= config::LENGTH_SCORER_PREFIX_MULTIPLIER;
    }

    score
}
