//! Tests for hierarchy implication closures.

use std::collections::BTreeSet;

use starpath::schema::HierarchyGraph;

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_transitive_chain() {
    let mut graph = HierarchyGraph::new();
    graph.implies("day", &["month"]).implies("month", &["quarter"]);
    graph.implies("quarter", &["half"]);

    assert_eq!(graph.implications("day"), set(&["month", "quarter", "half"]));
    assert_eq!(graph.implications("month"), set(&["quarter", "half"]));
    assert!(graph.determines("day", "half"));
    assert!(!graph.determines("half", "day"));
}

#[test]
fn test_cycle_terminates() {
    let mut graph = HierarchyGraph::new();
    graph
        .implies("a", &["b"])
        .implies("b", &["c"])
        .implies("c", &["a"]);

    let closure = graph.implications("a");
    assert!(closure.contains("b"));
    assert!(closure.contains("c"));
    // Reachable through the cycle
    assert!(closure.contains("a"));
    // Never determines itself
    assert!(!graph.determines("a", "a"));
}

#[test]
fn test_bidirectional() {
    let mut graph = HierarchyGraph::new();
    graph.bidirectional("name", "code");

    assert!(graph.determines("name", "code"));
    assert!(graph.determines("code", "name"));
}

#[test]
fn test_targets_created_implicitly() {
    let mut graph = HierarchyGraph::new();
    graph.implies("manufacturer", &["manufacturer_address"]);

    assert!(graph.contains("manufacturer_address"));
    assert!(graph.implications("manufacturer_address").is_empty());

    let mut elements: Vec<_> = graph.elements().collect();
    elements.sort();
    assert_eq!(elements, vec!["manufacturer", "manufacturer_address"]);
}

#[test]
fn test_unknown_name_has_empty_closure() {
    let graph = HierarchyGraph::new();
    assert!(graph.is_empty());
    assert!(graph.implications("missing").is_empty());
    assert!(!graph.determines("missing", "other"));
}
