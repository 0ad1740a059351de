//! Projection of the cached graph onto one time scope.

use std::collections::{HashMap, HashSet};

use crate::graph::CachedGraph;
use crate::model::{Link, Node, TimeScope};

/// The nodes and links of a single time scope.
///
/// Node ids are indexed when the view is built; an entry whose node id has
/// since been changed in place is treated as absent.
#[derive(Debug, Clone)]
pub struct ScopedGraph {
    pub scope: TimeScope,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    index: HashMap<String, usize>,
}

impl ScopedGraph {
    pub fn new(scope: impl Into<TimeScope>, nodes: Vec<Node>, links: Vec<Link>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        Self {
            scope: scope.into(),
            nodes,
            links,
            index,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index
            .get(id)
            .and_then(|&i| self.nodes.get(i))
            .filter(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Nodes keyed by id, for repeated lookups.
    pub fn node_map(&self) -> HashMap<&str, &Node> {
        self.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
    }
}

/// Select the nodes tagged with `scope`, and the links tagged with `scope`
/// whose endpoints are both among those nodes.
pub fn project(graph: &CachedGraph, scope: &TimeScope) -> ScopedGraph {
    let nodes: Vec<Node> = graph
        .nodes()
        .iter()
        .filter(|n| &n.scope == scope)
        .cloned()
        .collect();

    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let links = graph
        .links()
        .iter()
        .filter(|l| {
            &l.scope == scope && ids.contains(l.source.as_str()) && ids.contains(l.target.as_str())
        })
        .cloned()
        .collect();

    ScopedGraph::new(scope.clone(), nodes, links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinkKind, NodeKind};

    fn graph() -> CachedGraph {
        CachedGraph::new(
            "26",
            vec![
                Node::new("a", "A", NodeKind::Section, "before"),
                Node::new("b", "B", NodeKind::Section, "before"),
                Node::new("a", "A'", NodeKind::Section, "after"),
                Node::new("c", "C", NodeKind::Concept, "after"),
            ],
            vec![
                Link::new("a", "b", LinkKind::Reference, "before"),
                // tagged "after" but "b" only exists before
                Link::new("a", "b", LinkKind::Reference, "after"),
                // tagged "before" though both ids exist after
                Link::new("a", "c", LinkKind::Definition, "before"),
                Link::new("a", "c", LinkKind::Definition, "after"),
            ],
        )
    }

    #[test]
    fn test_projection_isolates_scope() {
        let g = graph();

        let before = project(&g, &TimeScope::new("before"));
        assert_eq!(before.nodes.len(), 2);
        assert_eq!(before.links.len(), 1);
        assert_eq!(before.links[0].target, "b");

        let after = project(&g, &TimeScope::new("after"));
        assert_eq!(after.nodes.len(), 2);
        assert_eq!(after.links.len(), 1);
        assert_eq!(after.links[0].target, "c");
        assert_eq!(after.node("a").map(|n| n.name.as_str()), Some("A'"));
    }

    #[test]
    fn test_lookup_by_id() {
        let mut view = project(&graph(), &TimeScope::new("before"));
        assert_eq!(view.node("b").map(|n| n.name.as_str()), Some("B"));
        assert!(view.contains("a"));
        assert!(!view.contains("c"));

        view.nodes[0].id = "z".to_string();
        assert!(view.node("a").is_none());
    }

    #[test]
    fn test_unknown_scope_is_empty() {
        let view = project(&graph(), &TimeScope::new("draft"));
        assert!(view.nodes.is_empty());
        assert!(view.links.is_empty());
    }
}
