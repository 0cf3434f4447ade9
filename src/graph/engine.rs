//! Graph engine: fragment store, item registry, and all graph mutations.
//!
//! [`FragmentGraph`] is a cloneable handle to shared state behind a single
//! reader-writer lock. `register` and `deregister` take the write lock and
//! rebuild or collapse graph structure; `walk_and_score` takes the read
//! lock for the duration of one traversal; `stats` reads atomic counters
//! without locking at all.
//!
//! Nodes live in a slab arena (`Vec<Option<FragmentNode>>` plus a free
//! list) and are addressed by stable `u32` ids. The fragment directory maps
//! interned fragment strings to ids; every live node appears there under
//! its own fragment, and nowhere else.

use crate::config;
use crate::graph::node::{Fragment, FragmentNode, NodeId};
use crate::graph::walker;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Sizes of the graph's internal collections, read without locking.
///
/// The two values are refreshed independently at the end of each mutation,
/// so a snapshot taken while a writer runs may mix pre- and post-state.
/// Callers treat it as approximate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Number of registered items.
    pub items: usize,
    /// Number of live fragment nodes.
    pub fragments: usize,
}

/// Internal graph state, protected by the engine-wide `RwLock`.
#[derive(Debug)]
pub(crate) struct GraphData<T> {
    /// fragment → node id. The authoritative directory of live nodes.
    pub(crate) ids: HashMap<Fragment, NodeId>,
    /// Slab arena owning every node. `None` slots are free.
    pub(crate) nodes: Vec<Option<FragmentNode<T>>>,
    /// Reusable slab slots.
    free: Vec<NodeId>,
    /// item → keywords it was registered with (union across registrations).
    keywords: HashMap<T, HashSet<Fragment>>,
}

/// The two length-minus-one children of a fragment: drop-last-char and
/// drop-first-char. `None` when the fragment has fewer than two characters.
fn child_fragments(fragment: &str) -> Option<(&str, &str)> {
    let first = fragment.chars().next()?;
    if first.len_utf8() == fragment.len() {
        return None;
    }
    let last = fragment.chars().next_back()?;
    Some((
        &fragment[..fragment.len() - last.len_utf8()],
        &fragment[first.len_utf8()..],
    ))
}

/// A pending node-materialization step: ensure `identity` exists, then
/// attach the registered item (top-level keyword only) and the parent edge.
struct Materialize {
    identity: Fragment,
    parent: Option<NodeId>,
    attach_item: bool,
}

impl<T: Clone + Eq + Hash> GraphData<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            keywords: HashMap::new(),
        }
    }

    /// Return the interned form of `s`: the existing directory key when the
    /// fragment is already known, a fresh shared allocation otherwise.
    fn intern(&self, s: &str) -> Fragment {
        match self.ids.get_key_value(s) {
            Some((key, _)) => key.clone(),
            None => Fragment::from(s),
        }
    }

    fn insert_node(&mut self, node: FragmentNode<T>) -> NodeId {
        let fragment = node.fragment().clone();
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id as usize] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                (self.nodes.len() - 1) as NodeId
            }
        };
        self.ids.insert(fragment, id);
        id
    }

    fn remove_node(&mut self, id: NodeId) -> Option<FragmentNode<T>> {
        let node = self.nodes[id as usize].take()?;
        self.ids.remove(node.fragment());
        self.free.push(id);
        Some(node)
    }

    /// Ensure nodes exist for `keyword` and its whole substring closure,
    /// attaching `item` at the keyword node and wiring parent edges along
    /// the way. Iterative worklist; depth would otherwise be O(len).
    fn materialize(&mut self, keyword: &str, item: &T) {
        let root = self.intern(keyword);
        let mut pending = vec![Materialize {
            identity: root,
            parent: None,
            attach_item: true,
        }];

        while let Some(step) = pending.pop() {
            let id = match self.ids.get(&*step.identity) {
                Some(&id) => id,
                None => {
                    let id = self.insert_node(FragmentNode::new(step.identity.clone()));
                    if let Some((prefix, suffix)) = child_fragments(&step.identity) {
                        pending.push(Materialize {
                            identity: self.intern(prefix),
                            parent: Some(id),
                            attach_item: false,
                        });
                        pending.push(Materialize {
                            identity: self.intern(suffix),
                            parent: Some(id),
                            attach_item: false,
                        });
                    }
                    id
                }
            };

            let Some(node) = self.nodes[id as usize].as_mut() else {
                continue;
            };
            if step.attach_item {
                node.add_item(item.clone());
            }
            if let Some(parent) = step.parent {
                node.add_parent(parent);
            }
        }
    }

    /// Collapse `start` if it has become unreferenced, cascading down the
    /// substring closure. A node removes itself from the directory before
    /// its children are examined, so a branch that was already collapsed
    /// terminates on the directory miss.
    fn collapse(&mut self, start: Fragment) {
        let mut pending: Vec<(Fragment, Option<NodeId>)> = vec![(start, None)];

        while let Some((fragment, parent)) = pending.pop() {
            let Some(&id) = self.ids.get(&*fragment) else {
                continue;
            };
            let Some(node) = self.nodes[id as usize].as_mut() else {
                continue;
            };
            if let Some(parent) = parent {
                node.remove_parent(parent);
            }
            if !node.is_unreferenced() {
                continue;
            }
            let Some(node) = self.remove_node(id) else {
                continue;
            };
            if let Some((prefix, suffix)) = child_fragments(node.fragment()) {
                pending.push((self.intern(prefix), Some(id)));
                pending.push((self.intern(suffix), Some(id)));
            }
        }
    }
}

struct Shared<T> {
    data: RwLock<GraphData<T>>,
    item_count: AtomicUsize,
    fragment_count: AtomicUsize,
}

/// The fragment graph engine.
///
/// A cloneable handle to shared graph state; clones address the same graph.
/// Items are opaque values compared by equality; the engine never mutates
/// them. All supplied keyword and query fragments must be non-empty; the
/// preparation layer upstream enforces this.
pub struct FragmentGraph<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for FragmentGraph<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Eq + Hash> Default for FragmentGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> FragmentGraph<T> {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                data: RwLock::new(GraphData::with_capacity(
                    config::FRAGMENT_STORE_INITIAL_CAPACITY,
                )),
                item_count: AtomicUsize::new(0),
                fragment_count: AtomicUsize::new(0),
            }),
        }
    }

    /// Register `item` under each keyword, materializing any missing graph
    /// structure and unioning the keywords into the item's registry entry.
    ///
    /// Atomic with respect to readers. Re-registering an item with
    /// overlapping keywords is idempotent beyond the registry union.
    pub fn register(&self, item: T, keywords: &[&str]) {
        let mut data = self.shared.data.write();
        for keyword in keywords {
            data.materialize(keyword, &item);
        }
        let interned: Vec<Fragment> = keywords.iter().map(|kw| data.intern(kw)).collect();
        data.keywords.entry(item).or_default().extend(interned);
        self.refresh_counters(&data);
        tracing::debug!(
            keywords = keywords.len(),
            fragments = data.ids.len(),
            "registered item"
        );
    }

    /// Remove `item` from every node it is attached at, collapsing nodes
    /// that become unreferenced. Returns whether the item was registered;
    /// an unknown item is a silent no-op.
    pub fn deregister(&self, item: &T) -> bool {
        let mut data = self.shared.data.write();
        let Some(keywords) = data.keywords.remove(item) else {
            return false;
        };
        for keyword in keywords {
            let Some(&id) = data.ids.get(&keyword) else {
                continue;
            };
            let Some(node) = data.nodes[id as usize].as_mut() else {
                continue;
            };
            node.remove_item(item);
            if node.items().is_empty() {
                data.collapse(keyword);
            }
        }
        self.refresh_counters(&data);
        tracing::debug!(fragments = data.ids.len(), "deregistered item");
        true
    }

    /// Walk upward from `fragment`, scoring every reachable node that
    /// carries items and keeping each item's maximum score.
    ///
    /// Returns an empty map when the fragment is unknown. The scorer runs
    /// under the read lock and must not call back into the engine.
    pub fn walk_and_score<S>(&self, fragment: &str, scorer: S) -> HashMap<T, f64>
    where
        S: FnMut(&str, &str) -> f64,
    {
        let data = self.shared.data.read();
        walker::walk_and_score(&data, fragment, scorer)
    }

    /// Whether `fragment` currently has an entry node.
    pub fn contains_fragment(&self, fragment: &str) -> bool {
        self.shared.data.read().ids.contains_key(fragment)
    }

    /// The keywords `item` was registered with, as a cloned snapshot.
    /// Empty when the item is unknown.
    pub fn keywords_of(&self, item: &T) -> HashSet<Fragment> {
        self.shared
            .data
            .read()
            .keywords
            .get(item)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop every node and registry entry.
    pub fn clear(&self) {
        let mut data = self.shared.data.write();
        data.ids.clear();
        data.nodes.clear();
        data.free.clear();
        data.keywords.clear();
        self.refresh_counters(&data);
        tracing::debug!("cleared graph");
    }

    /// Lock-free observational snapshot of collection sizes.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            items: self.shared.item_count.load(Ordering::Relaxed),
            fragments: self.shared.fragment_count.load(Ordering::Relaxed),
        }
    }

    fn refresh_counters(&self, data: &GraphData<T>) {
        self.shared
            .item_count
            .store(data.keywords.len(), Ordering::Relaxed);
        self.shared
            .fragment_count
            .store(data.ids.len(), Ordering::Relaxed);
    }

    /// Validate internal invariants.
    ///
    /// Checks directory/slab agreement, interning, edge integrity in both
    /// directions, node liveness rules, and registry/node agreement.
    /// Intended for tests and debugging; takes the read lock.
    pub fn validate(&self) -> Result<(), String> {
        let data = self.shared.data.read();

        let live = data.nodes.iter().filter(|slot| slot.is_some()).count();
        if live != data.ids.len() {
            return Err(format!(
                "live node count {} != directory size {}",
                live,
                data.ids.len()
            ));
        }

        let mut free_seen = HashSet::new();
        for &id in &data.free {
            if id as usize >= data.nodes.len() {
                return Err(format!("free id {} out of bounds", id));
            }
            if data.nodes[id as usize].is_some() {
                return Err(format!("free id {} points at a live node", id));
            }
            if !free_seen.insert(id) {
                return Err(format!("free id {} listed twice", id));
            }
        }

        for (fragment, &id) in &data.ids {
            if fragment.is_empty() {
                return Err("empty fragment in directory".to_string());
            }
            let Some(node) = data.nodes.get(id as usize).and_then(Option::as_ref) else {
                return Err(format!("directory entry '{}' -> {} is dead", fragment, id));
            };
            if !Arc::ptr_eq(fragment, node.fragment()) {
                return Err(format!("fragment '{}' not interned with its node", fragment));
            }
        }

        for (id, slot) in data.nodes.iter().enumerate() {
            let Some(node) = slot.as_ref() else { continue };
            let fragment = node.fragment();

            if node.is_unreferenced() {
                return Err(format!("node '{}' is live but unreferenced", fragment));
            }

            if let Some((prefix, suffix)) = child_fragments(fragment) {
                for child in [prefix, suffix] {
                    let Some(&child_id) = data.ids.get(child) else {
                        return Err(format!("child '{}' of '{}' missing", child, fragment));
                    };
                    let Some(child_node) = data.nodes[child_id as usize].as_ref() else {
                        return Err(format!("child '{}' of '{}' is dead", child, fragment));
                    };
                    if !child_node.parents().contains(&(id as NodeId)) {
                        return Err(format!(
                            "child '{}' does not list parent '{}'",
                            child, fragment
                        ));
                    }
                }
            }

            for &parent in node.parents() {
                let Some(parent_node) = data
                    .nodes
                    .get(parent as usize)
                    .and_then(Option::as_ref)
                else {
                    return Err(format!("node '{}' lists dead parent {}", fragment, parent));
                };
                let is_child = child_fragments(parent_node.fragment())
                    .map(|(prefix, suffix)| {
                        &**fragment == prefix || &**fragment == suffix
                    })
                    .unwrap_or(false);
                if !is_child {
                    return Err(format!(
                        "node '{}' lists parent '{}' it is not a child of",
                        fragment,
                        parent_node.fragment()
                    ));
                }
            }
        }

        for (item, keywords) in &data.keywords {
            for keyword in keywords {
                let Some(&id) = data.ids.get(keyword) else {
                    return Err(format!("registered keyword '{}' has no node", keyword));
                };
                let Some(node) = data.nodes[id as usize].as_ref() else {
                    return Err(format!("registered keyword '{}' node is dead", keyword));
                };
                if !node.items().contains(item) {
                    return Err(format!(
                        "keyword node '{}' does not carry its registered item",
                        keyword
                    ));
                }
            }
        }

        if self.shared.item_count.load(Ordering::Relaxed) != data.keywords.len() {
            return Err("item counter out of sync".to_string());
        }
        if self.shared.fragment_count.load(Ordering::Relaxed) != data.ids.len() {
            return Err("fragment counter out of sync".to_string());
        }

        Ok(())
    }
}
