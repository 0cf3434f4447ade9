//! Keyword extraction and normalization defaults.
//!
//! Raw item keywords and raw query input both arrive as free-form text;
//! extraction splits it into candidate keywords and normalization folds
//! each into its canonical stored form. Both steps are pluggable through
//! the search builder; these are the defaults.

/// Split free-form input on non-alphanumeric boundaries.
///
/// `"one two,three-four"` and `"one$two%three^four"` both yield
/// `["one", "two", "three", "four"]`. Duplicates are kept; preparation
/// de-duplicates after normalization.
pub fn extract_keywords(input: &str) -> Vec<String> {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Canonical stored form of a keyword: lowercased.
///
/// Lowercasing both registered keywords and query input makes matching
/// case-insensitive. A normalizer may also remap special characters to
/// latin equivalents; returning an empty string drops the keyword.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.to_lowercase()
}
