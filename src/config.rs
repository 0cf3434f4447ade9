//! Global configuration constants for quicksearch.
//!
//! Scoring defaults and container pre-sizing knobs live here as compile-time
//! constants; per-instance behavior (extractor, normalizer, scorer, minimum
//! keyword length) is configured through the search builder.

/// Default minimum keyword length enforced when registering items.
///
/// Keywords shorter than this are dropped during preparation. Applies only
/// to registration input; query input is never length-filtered so that a
/// single typed character can already narrow results.
pub const DEFAULT_MINIMUM_KEYWORD_LENGTH: usize = 2;

/// Score bonus added by the default scorer when the matched keyword starts
/// with the query fragment.
///
/// Prefix hits are what interactive users expect to see first, so they
/// outrank any pure-ratio interior match (which tops out at 1.0).
pub const PREFIX_MATCH_BONUS: f64 = 1.0;

/// Multiplier applied by the length-preferring scorer on prefix matches.
pub const LENGTH_SCORER_PREFIX_MULTIPLIER: f64 = 2.0;

/// Initial capacity of the fragment directory and node slab.
///
/// A dataset of a few hundred keywords already interns thousands of
/// fragments; starting here avoids the early rehash churn.
pub const FRAGMENT_STORE_INITIAL_CAPACITY: usize = 1024;

/// Initial capacity of the walker's traversal stack.
///
/// Walk depth is bounded by the longest registered keyword; typical
/// keywords stay well under this.
pub const WALK_STACK_INITIAL_CAPACITY: usize = 64;
