//! Bottom-up network builder.
//!
//! Turns a keyword request into a capped subgraph of a scoped view:
//!
//! 1. **Seed matching** - nodes of an allowed kind whose eligible fields
//!    contain the search terms (all of them, or any, per [`MatchLogic`]).
//! 2. **Ranking** - seeds and expansion candidates are ordered by degree,
//!    either dataset-wide or within the nodes assembled so far
//!    ([`RankingMode`]). Ties keep encounter order.
//! 3. **Expansion** - breadth-first over allowed link kinds, up to
//!    `expansion_depth` levels, admitting at most `max_nodes_per_expansion`
//!    neighbours per expanded node and stopping once `max_total_nodes` is
//!    reached.
//! 4. **Assembly** - the kept nodes plus every allowed link between them.
//!
//! # Example
//!
//! ```ignore
//! use lexnet_core::builder::{build_network, BuilderRequest, MatchLogic};
//!
//! let request = BuilderRequest::new(["tax", "income"]).with_logic(MatchLogic::Disjunctive);
//! let result = build_network(&scoped, &request)?;
//! println!("{} seeds, {} nodes", result.matched_count, result.nodes.len());
//! ```

mod matcher;
mod request;

pub use request::{BuilderRequest, MatchLogic, RankingMode, SearchField};

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GraphError;
use crate::model::{Link, Node};
use crate::ranking::{rank_by, retain_top};
use crate::scope::ScopedGraph;

use matcher::Matcher;

/// Output of one builder run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderResult {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    /// Whether any cap dropped a candidate.
    pub truncated: bool,
    /// Seed matches before any capping.
    pub matched_count: usize,
}

impl BuilderResult {
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }
}

/// Undirected neighbour lists over the allowed links, one entry per link
/// endpoint so that counting entries gives degree.
struct Adjacency<'g> {
    neighbours: HashMap<&'g str, Vec<&'g str>>,
}

impl<'g> Adjacency<'g> {
    fn new(links: &[&'g Link]) -> Self {
        let mut neighbours: HashMap<&str, Vec<&str>> = HashMap::new();
        for &link in links {
            neighbours.entry(&link.source).or_default().push(&link.target);
            neighbours.entry(&link.target).or_default().push(&link.source);
        }
        Self { neighbours }
    }

    fn of(&self, id: &str) -> &[&'g str] {
        self.neighbours.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of links between `id` and members of `set`.
    fn degree_within(&self, id: &str, set: &HashSet<&str>) -> usize {
        self.of(id).iter().filter(|n| set.contains(*n)).count()
    }
}

struct Ranker<'g> {
    mode: RankingMode,
    nodes: HashMap<&'g str, &'g Node>,
    adjacency: Adjacency<'g>,
}

impl<'g> Ranker<'g> {
    fn score(&self, id: &str, assembled: &HashSet<&str>) -> usize {
        match self.mode {
            RankingMode::Global => self.nodes.get(id).map(|n| n.degree as usize).unwrap_or(0),
            RankingMode::Subgraph => self.adjacency.degree_within(id, assembled),
        }
    }
}

/// Build a capped network for `request` over a scoped view.
///
/// The request is validated before any matching; an invalid request fails
/// with [`GraphError::InvalidRequest`]. No seed matches gives an empty,
/// untruncated result.
pub fn build_network(graph: &ScopedGraph, request: &BuilderRequest) -> Result<BuilderResult, GraphError> {
    let needles = request.validate()?;
    let matcher = Matcher::new(needles, request.fields.iter().copied(), request.logic);

    let mut seeds: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| request.node_kinds.contains(&n.kind) && matcher.matches(n))
        .map(|n| n.id.as_str())
        .collect();
    let matched_count = seeds.len();

    if seeds.is_empty() {
        debug!(terms = ?request.terms, "no seed matches");
        return Ok(BuilderResult::default());
    }

    let allowed_links: Vec<&Link> = graph
        .links
        .iter()
        .filter(|l| request.edge_kinds.contains(&l.kind))
        .collect();

    let ranker = Ranker {
        mode: request.ranking,
        nodes: graph.node_map(),
        adjacency: Adjacency::new(&allowed_links),
    };

    let mut truncated = false;

    // Seeds are scored among themselves in subgraph mode.
    let seed_set: HashSet<&str> = seeds.iter().copied().collect();
    rank_by(&mut seeds, |id| ranker.score(id, &seed_set));
    if seeds.len() > request.max_total_nodes {
        seeds.truncate(request.max_total_nodes);
        truncated = true;
    }

    let mut included: Vec<&str> = seeds.clone();
    let mut assembled: HashSet<&str> = seeds.iter().copied().collect();
    let mut frontier = seeds;

    'levels: for level in 0..request.expansion_depth {
        let mut next = Vec::new();

        for &parent in &frontier {
            let mut seen: HashSet<&str> = HashSet::new();
            let mut candidates: Vec<&str> = ranker
                .adjacency
                .of(parent)
                .iter()
                .copied()
                .filter(|id| !assembled.contains(id) && seen.insert(*id))
                .filter(|id| {
                    ranker
                        .nodes
                        .get(id)
                        .is_some_and(|n| request.node_kinds.contains(&n.kind))
                })
                .collect();

            if candidates.is_empty() {
                continue;
            }

            let remaining = request.max_total_nodes - included.len();
            if remaining == 0 {
                truncated = true;
                debug!(level, "node budget reached, stopping expansion");
                break 'levels;
            }

            rank_by(&mut candidates, |id| ranker.score(id, &assembled));
            let admit = request.max_nodes_per_expansion.min(remaining);
            if candidates.len() > admit {
                candidates.truncate(admit);
                truncated = true;
            }

            for id in candidates {
                assembled.insert(id);
                included.push(id);
                next.push(id);
            }
        }

        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    let kept = retain_top(included, request.max_total_nodes, |id| ranker.score(id, &assembled));
    truncated |= kept.truncated;

    let node_ids: HashSet<&str> = kept.items.iter().copied().collect();
    let nodes: Vec<Node> = kept
        .items
        .iter()
        .filter_map(|id| ranker.nodes.get(id).map(|n| (*n).clone()))
        .collect();
    let links: Vec<Link> = allowed_links
        .into_iter()
        .filter(|l| node_ids.contains(l.source.as_str()) && node_ids.contains(l.target.as_str()))
        .cloned()
        .collect();

    debug!(
        matched = matched_count,
        nodes = nodes.len(),
        links = links.len(),
        truncated,
        "network built"
    );

    Ok(BuilderResult {
        nodes,
        links,
        truncated,
        matched_count,
    })
}
