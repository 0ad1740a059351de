//! Degree-based ranking and truncation.
//!
//! One algorithm, two budgets: capping a list of links by count
//! ([`truncate_links`]) and capping the number of distinct nodes a listing
//! touches ([`apply_node_budget`]). Both are deterministic: scores sort
//! descending and ties keep their original relative order.

use std::collections::{HashMap, HashSet};

use crate::model::Link;

/// Anything with two node-id endpoints.
pub trait Edge {
    fn source(&self) -> &str;
    fn target(&self) -> &str;
}

impl Edge for Link {
    fn source(&self) -> &str {
        &self.source
    }

    fn target(&self) -> &str {
        &self.target
    }
}

impl<E: Edge> Edge for &E {
    fn source(&self) -> &str {
        (**self).source()
    }

    fn target(&self) -> &str {
        (**self).target()
    }
}

/// Outcome of a truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct Truncated<T> {
    pub items: Vec<T>,
    /// Whether anything was dropped.
    pub truncated: bool,
}

/// Per-node endpoint counts within `edges`.
pub fn degree_map<E: Edge>(edges: &[E]) -> HashMap<String, usize> {
    let mut degree: HashMap<String, usize> = HashMap::new();
    for edge in edges {
        *degree.entry(edge.source().to_string()).or_insert(0) += 1;
        *degree.entry(edge.target().to_string()).or_insert(0) += 1;
    }
    degree
}

/// Stable sort by descending score.
pub fn rank_by<T, F>(items: &mut [T], score: F)
where
    F: Fn(&T) -> usize,
{
    items.sort_by_cached_key(|item| std::cmp::Reverse(score(item)));
}

/// Keep the `limit` highest-scoring items, ties in original order.
///
/// The survivors come back in ranked order.
pub fn retain_top<T, F>(mut items: Vec<T>, limit: usize, score: F) -> Truncated<T>
where
    F: Fn(&T) -> usize,
{
    if items.len() <= limit {
        return Truncated {
            items,
            truncated: false,
        };
    }
    rank_by(&mut items, score);
    items.truncate(limit);
    Truncated {
        items,
        truncated: true,
    }
}

/// Cap a link list at `limit`, keeping the links between the busiest nodes.
///
/// A link scores the sum of its endpoints' degrees within `edges`.
pub fn truncate_links<E: Edge>(edges: Vec<E>, limit: usize) -> Truncated<E> {
    if edges.len() <= limit {
        return Truncated {
            items: edges,
            truncated: false,
        };
    }
    let degree = degree_map(&edges);
    let score = |e: &E| degree[e.source()] + degree[e.target()];
    retain_top(edges, limit, score)
}

/// Cap the number of distinct nodes touched by `edges` at `max_nodes`.
///
/// Nodes rank individually by degree within `edges` (first appearance
/// breaks ties). Every edge touching a dropped node is removed; the
/// remaining edges keep their order.
pub fn apply_node_budget<E: Edge>(edges: Vec<E>, max_nodes: usize) -> Truncated<E> {
    let mut order: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for edge in &edges {
        for id in [edge.source(), edge.target()] {
            if seen.insert(id) {
                order.push(id);
            }
        }
    }

    if order.len() <= max_nodes {
        return Truncated {
            items: edges,
            truncated: false,
        };
    }

    let degree = degree_map(&edges);
    let kept: HashSet<String> = retain_top(order, max_nodes, |id| degree[*id])
        .items
        .into_iter()
        .map(str::to_string)
        .collect();

    let items = edges
        .into_iter()
        .filter(|e| kept.contains(e.source()) && kept.contains(e.target()))
        .collect();

    Truncated {
        items,
        truncated: true,
    }
}
