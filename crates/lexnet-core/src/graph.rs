//! The immutable, merged graph for one title.

use std::collections::{BTreeSet, HashMap};

use crate::model::{Link, Node, TimeScope};

/// Every node and link of one title, across all time scopes.
///
/// Built once per load and never mutated afterwards; the store swaps
/// whole graphs behind an `Arc`.
#[derive(Debug)]
pub struct CachedGraph {
    title: String,
    nodes: Vec<Node>,
    links: Vec<Link>,
    index: HashMap<(TimeScope, String), usize>,
}

impl CachedGraph {
    pub fn new(title: impl Into<String>, nodes: Vec<Node>, links: Vec<Link>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| ((n.scope.clone(), n.id.clone()), i))
            .collect();

        Self {
            title: title.into(),
            nodes,
            links,
            index,
        }
    }

    /// Title id this graph was loaded for.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Look up a node by id within a scope.
    pub fn node(&self, scope: &TimeScope, id: &str) -> Option<&Node> {
        self.index
            .get(&(scope.clone(), id.to_string()))
            .map(|&i| &self.nodes[i])
    }

    /// Distinct scope tags present on nodes, sorted.
    pub fn scopes(&self) -> Vec<TimeScope> {
        self.nodes
            .iter()
            .map(|n| n.scope.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
