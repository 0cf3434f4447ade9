//! Structural invariant tests for the fragment graph.
//!
//! `FragmentGraph::validate()` checks directory/slab agreement, interning,
//! edge integrity in both directions, liveness, and registry/node
//! agreement; these tests drive operation sequences through the engine and
//! validate after every step.

use quicksearch::graph::{FragmentGraph, GraphStats};
use std::collections::HashMap;
use std::sync::Mutex;

fn graph() -> FragmentGraph<&'static str> {
    FragmentGraph::new()
}

#[test]
fn invariants_hold_across_interleaved_registrations() {
    let g = graph();
    let items: &[(&str, &[&str])] = &[
        ("A", &["apple", "ample"]),
        ("B", &["ample", "maple"]),
        ("C", &["app", "le"]),
        ("D", &["apple"]),
    ];
    for &(item, keywords) in items {
        g.register(item, keywords);
        g.validate().unwrap();
    }
    for &(item, _) in items.iter().rev() {
        g.deregister(&item);
        g.validate().unwrap();
    }
    assert_eq!(g.stats(), GraphStats { items: 0, fragments: 0 });
}

#[test]
fn register_then_deregister_all_leaves_nothing() {
    // full teardown restores the empty graph
    let g = graph();
    let dataset = [
        ("jane", "jane doe marketing manager"),
        ("alice", "alice stuggard tech cryptography manager"),
        ("robert", "robert bob howard tech cryptography"),
        ("eve", "eve moneypenny accounting manager"),
    ];
    for &(item, keywords) in &dataset {
        let kws: Vec<&str> = keywords.split(' ').collect();
        g.register(item, &kws);
    }
    g.validate().unwrap();
    for &(item, _) in &dataset {
        assert!(g.deregister(&item));
    }
    assert_eq!(g.stats(), GraphStats { items: 0, fragments: 0 });
    g.validate().unwrap();
}

#[test]
fn register_is_idempotent() {
    // a second identical registration changes nothing observable
    let g = graph();
    g.register("A", &["apple", "ample"]);
    let stats_first = g.stats();
    let walk_first = g.walk_and_score("pl", |_, k| k.len() as f64);

    g.register("A", &["apple", "ample"]);
    assert_eq!(g.stats(), stats_first);
    assert_eq!(g.walk_and_score("pl", |_, k| k.len() as f64), walk_first);
    g.validate().unwrap();
}

#[test]
fn walk_accumulates_the_maximum_score() {
    // per item, the result is the max over its scoring ancestors
    let g = graph();
    g.register("A", &["abcd", "zabc"]);
    g.register("B", &["abc"]);
    let scores = g.walk_and_score("abc", |_, k| k.len() as f64);
    // "abc" reaches "abcd" (4) and "zabc" (4) for A, and itself (3) for B
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[&"A"], 4.0);
    assert_eq!(scores[&"B"], 3.0);
}

#[test]
fn walk_prunes_scores_at_zero() {
    let g = graph();
    g.register("A", &["abcd"]);
    g.register("B", &["abce"]);
    let scores = g.walk_and_score("abc", |_, k| if k.ends_with('d') { 1.0 } else { 0.0 });
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[&"A"], 1.0);
}

#[test]
fn walk_visits_each_node_at_most_once() {
    // instrument the scorer with a per-fragment call counter. Dense
    // overlapping keywords give the graph plenty of diamond shapes.
    let g = graph();
    g.register("A", &["aaaa", "aaab", "abab", "baba"]);
    g.register("B", &["aabb", "bbaa"]);

    let calls: Mutex<HashMap<String, usize>> = Mutex::new(HashMap::new());
    g.walk_and_score("a", |_, node_fragment| {
        *calls
            .lock()
            .unwrap()
            .entry(node_fragment.to_string())
            .or_insert(0) += 1;
        1.0
    });

    let calls = calls.into_inner().unwrap();
    assert!(!calls.is_empty());
    for (fragment, count) in &calls {
        assert_eq!(*count, 1, "node '{}' scored {} times", fragment, count);
    }
}

#[test]
fn clear_reports_empty_stats() {
    let g = graph();
    g.register("A", &["apple"]);
    g.register("B", &["banana"]);
    g.clear();
    assert_eq!(g.stats(), GraphStats { items: 0, fragments: 0 });
    g.validate().unwrap();
}

#[test]
fn partial_overlap_teardown_keeps_shared_structure_exact() {
    let g = graph();
    g.register("A", &["abcde"]);
    g.register("B", &["bcd"]);
    g.deregister(&"A");
    g.validate().unwrap();
    // everything unique to "abcde" is gone, the "bcd" closure survives
    for fragment in ["abcde", "abcd", "bcde", "abc", "cde", "ab", "de", "a", "e"] {
        assert!(!g.contains_fragment(fragment), "'{}' should be gone", fragment);
    }
    for fragment in ["bcd", "bc", "cd", "b", "c", "d"] {
        assert!(g.contains_fragment(fragment), "'{}' should remain", fragment);
    }
    assert_eq!(g.stats(), GraphStats { items: 1, fragments: 6 });
}

#[test]
fn deregister_only_touches_the_requested_item() {
    let g = graph();
    g.register("A", &["shared"]);
    g.register("B", &["shared"]);
    g.deregister(&"A");
    g.validate().unwrap();
    assert!(g.contains_fragment("shared"));
    let scores = g.walk_and_score("shared", |_, _| 1.0);
    assert_eq!(scores.len(), 1);
    assert!(scores.contains_key(&"B"));
}

#[test]
fn keywords_of_snapshot_is_detached() {
    let g = graph();
    g.register("A", &["red"]);
    let before = g.keywords_of(&"A");
    g.register("A", &["shoe"]);
    assert_eq!(before.len(), 1);
    assert_eq!(g.keywords_of(&"A").len(), 2);
}

#[test]
fn concurrent_walkers_and_mutators() {
    use std::thread;

    let g: FragmentGraph<usize> = FragmentGraph::new();
    let words = ["apple", "ample", "maple", "staple", "grapple"];
    for (i, &word) in words.iter().enumerate() {
        g.register(i, &[word]);
    }

    let mut handles = Vec::new();
    for _ in 0..4 {
        let g = g.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                let scores = g.walk_and_score("ple", |_, k| k.len() as f64);
                // long-lived items atomically appear with their full score;
                // the mutator's transient items come and go
                for (&item, &score) in &scores {
                    if item < words.len() {
                        assert_eq!(score, words[item].len() as f64);
                    }
                }
            }
        }));
    }
    {
        let g = g.clone();
        handles.push(thread::spawn(move || {
            for round in 0..50 {
                let item = 100 + (round % 3);
                g.register(item, &["maple", "pleat"]);
                assert!(g.deregister(&item));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    g.validate().unwrap();
    assert_eq!(g.stats().items, words.len());
}
