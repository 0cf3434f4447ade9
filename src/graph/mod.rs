//! The fragment graph: a shared multi-root DAG over keyword substrings.
//!
//! Every contiguous substring of every registered keyword is interned as a
//! node. Edges point *upward*: a node lists as parents the nodes whose
//! fragment is one character longer (the node's fragment plus a leading or
//! trailing character). Items attach at the nodes for the keywords they
//! were registered with, so walking upward from any fragment reaches
//! exactly the registered keywords containing it.
//!
//! Nodes are owned by a slab arena and addressed by stable `u32` ids; the
//! fragment directory maps interned fragment strings to ids. The whole
//! graph sits behind a single reader-writer lock: reads vastly outnumber
//! writes, a single write touches O(len²) fragments per keyword, and the
//! structure is small enough that hold times stay short.

/// Graph engine: fragment store, item registry, mutations, and stats.
pub mod engine;
/// Fragment node: interned identity plus compact item and parent sets.
pub mod node;
/// Scored upward traversal and its visited-set bookkeeping.
pub mod walker;

pub use engine::{FragmentGraph, GraphStats};
pub use node::{Fragment, FragmentNode};
