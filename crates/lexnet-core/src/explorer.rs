//! Read-only queries over a scoped view: node details, name search,
//! relationship listings and per-kind counts.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_RELATIONSHIP_LIMIT, DEFAULT_RELATIONSHIP_MAX_NODES};
use crate::model::{Link, LinkKind, Node, NodeKind, TimeScope};
use crate::ranking::{apply_node_budget, rank_by, truncate_links, Edge};
use crate::scope::ScopedGraph;

// =============================================================================
// Node Details
// =============================================================================

/// A neighbouring node reached through one link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbour {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub edge_kind: LinkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Result of a per-node detail lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeDetail {
    Found {
        node: Node,
        /// Links leaving this node.
        outgoing: Vec<Neighbour>,
        /// Links arriving at this node.
        incoming: Vec<Neighbour>,
    },
    /// No details available; never an error.
    Unavailable { reason: String },
}

impl NodeDetail {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        NodeDetail::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn node(&self) -> Option<&Node> {
        match self {
            NodeDetail::Found { node, .. } => Some(node),
            NodeDetail::Unavailable { .. } => None,
        }
    }
}

/// Details of node `id` within the scoped view.
pub fn node_detail(graph: &ScopedGraph, id: &str) -> NodeDetail {
    let Some(node) = graph.node(id) else {
        return NodeDetail::unavailable(format!("no node '{}' in scope {}", id, graph.scope));
    };

    let nodes = graph.node_map();
    let neighbour = |other: &str, link: &Link| {
        nodes.get(other).map(|n| Neighbour {
            id: n.id.clone(),
            label: n.label().to_string(),
            kind: n.kind,
            edge_kind: link.kind,
            action: link.action.clone(),
        })
    };

    let outgoing = graph
        .links
        .iter()
        .filter(|l| l.source == id)
        .filter_map(|l| neighbour(&l.target, l))
        .collect();
    let incoming = graph
        .links
        .iter()
        .filter(|l| l.target == id)
        .filter_map(|l| neighbour(&l.source, l))
        .collect();

    NodeDetail::Found {
        node: node.clone(),
        outgoing,
        incoming,
    }
}

// =============================================================================
// Name Search
// =============================================================================

/// A node matched by name or label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeHit {
    pub id: String,
    pub name: String,
    pub label: String,
    pub kind: NodeKind,
    pub degree: u32,
}

/// Case-insensitive substring search over node names and display labels.
///
/// Hits are ordered by degree, busiest first.
pub fn search_nodes(graph: &ScopedGraph, query: &str, limit: usize) -> Vec<NodeHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<&Node> = graph
        .nodes
        .iter()
        .filter(|n| {
            n.name.to_lowercase().contains(&needle)
                || n.display_label
                    .as_deref()
                    .is_some_and(|l| l.to_lowercase().contains(&needle))
        })
        .collect();

    rank_by(&mut hits, |n| n.degree as usize);

    hits.into_iter()
        .take(limit)
        .map(|n| NodeHit {
            id: n.id.clone(),
            name: n.name.clone(),
            label: n.label().to_string(),
            kind: n.kind,
            degree: n.degree,
        })
        .collect()
}

// =============================================================================
// Relationship Listing
// =============================================================================

/// Filters and budgets for a relationship listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipQuery {
    /// Only these link kinds; `None` means all.
    pub edge_kinds: Option<BTreeSet<LinkKind>>,
    /// Only links whose endpoints both have one of these kinds.
    pub node_kinds: Option<BTreeSet<NodeKind>>,
    /// Maximum relationships returned.
    pub limit: usize,
    /// Maximum distinct nodes touched.
    pub max_nodes: Option<usize>,
}

impl Default for RelationshipQuery {
    fn default() -> Self {
        Self {
            edge_kinds: None,
            node_kinds: None,
            limit: DEFAULT_RELATIONSHIP_LIMIT,
            max_nodes: Some(DEFAULT_RELATIONSHIP_MAX_NODES),
        }
    }
}

/// Every link sharing (source, target, kind), folded into one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub source_label: String,
    pub target_label: String,
    pub kind: LinkKind,
    /// First non-empty action label seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Summed link weight.
    pub weight: f64,
    /// Number of links folded in.
    pub count: usize,
}

impl Edge for Relationship {
    fn source(&self) -> &str {
        &self.source
    }

    fn target(&self) -> &str {
        &self.target
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipListing {
    pub scope: TimeScope,
    pub relationships: Vec<Relationship>,
    /// Aggregated relationships before any truncation.
    pub total: usize,
    pub truncated: bool,
}

/// List the relationships of a scoped view, filtered, aggregated and capped.
pub fn relationships(graph: &ScopedGraph, query: &RelationshipQuery) -> RelationshipListing {
    let nodes = graph.node_map();
    let kind_ok = |id: &str| match &query.node_kinds {
        Some(kinds) => nodes.get(id).is_some_and(|n| kinds.contains(&n.kind)),
        None => true,
    };

    let mut slots: HashMap<(&str, &str, LinkKind), usize> = HashMap::new();
    let mut aggregated: Vec<Relationship> = Vec::new();

    for link in &graph.links {
        if query.edge_kinds.as_ref().is_some_and(|k| !k.contains(&link.kind)) {
            continue;
        }
        if !kind_ok(&link.source) || !kind_ok(&link.target) {
            continue;
        }

        let key = (link.source.as_str(), link.target.as_str(), link.kind);
        match slots.get(&key) {
            Some(&i) => {
                let rel = &mut aggregated[i];
                rel.weight += link.weight;
                rel.count += 1;
                if rel.action.is_none() {
                    rel.action = link.action.clone();
                }
            }
            None => {
                slots.insert(key, aggregated.len());
                aggregated.push(Relationship {
                    source: link.source.clone(),
                    target: link.target.clone(),
                    source_label: label_of(&nodes, &link.source),
                    target_label: label_of(&nodes, &link.target),
                    kind: link.kind,
                    action: link.action.clone(),
                    weight: link.weight,
                    count: 1,
                });
            }
        }
    }

    let total = aggregated.len();
    let limited = truncate_links(aggregated, query.limit);
    let mut truncated = limited.truncated;
    let mut relationships = limited.items;

    if let Some(max_nodes) = query.max_nodes {
        let budgeted = apply_node_budget(relationships, max_nodes);
        truncated |= budgeted.truncated;
        relationships = budgeted.items;
    }

    RelationshipListing {
        scope: graph.scope.clone(),
        relationships,
        total,
        truncated,
    }
}

fn label_of(nodes: &HashMap<&str, &Node>, id: &str) -> String {
    nodes
        .get(id)
        .map(|n| n.label().to_string())
        .unwrap_or_else(|| id.to_string())
}

// =============================================================================
// Counts
// =============================================================================

/// Size summary of a scoped view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCounts {
    pub total_nodes: usize,
    pub total_links: usize,
    pub by_kind: BTreeMap<NodeKind, usize>,
    pub links_by_kind: BTreeMap<LinkKind, usize>,
}

pub fn node_counts(graph: &ScopedGraph) -> NodeCounts {
    let mut counts = NodeCounts {
        total_nodes: graph.nodes.len(),
        total_links: graph.links.len(),
        ..NodeCounts::default()
    };
    for node in &graph.nodes {
        *counts.by_kind.entry(node.kind).or_insert(0) += 1;
    }
    for link in &graph.links {
        *counts.links_by_kind.entry(link.kind).or_insert(0) += 1;
    }
    counts
}
