//! # quicksearch
//!
//! Embeddable in-memory quick-search index for low-latency interactive
//! matching: items are registered with arbitrary keywords, queries are
//! free-form partial input, and results come back ranked while the user is
//! still typing.
//!
//! The engine decomposes every keyword into all of its contiguous
//! substrings and links them into a shared fragment graph, so any partially
//! entered term is a single map lookup away from the keywords containing
//! it. The graph is fully incremental (removing an item collapses exactly
//! the fragments nothing else references) and is built for read-heavy
//! concurrent use behind one reader-writer lock.
//!
//! This is a library crate with zero async dependencies, suitable for
//! embedding directly in an application or behind whatever serving layer
//! the host provides.

/// Global tuning constants: scoring defaults and container pre-sizing.
pub mod config;
/// The fragment graph: node representation, graph engine, and the scored walk.
pub mod graph;
/// Match scorers: default ratio-with-prefix-bonus and length-preferring variants.
pub mod scorer;
/// User-facing search facade: keyword preparation, querying, and ranked results.
pub mod search;
/// Keyword extraction and normalization defaults.
pub mod tokenizer;
