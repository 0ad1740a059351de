//! API request and response types for the local server.
//!
//! These are Data Transfer Objects (DTOs) that define the shape of
//! JSON exchanged with clients.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use lexnet_core::config::{BuilderConfig, RelationshipConfig, DEFAULT_NODE_SEARCH_LIMIT};
use lexnet_core::{
    BuilderRequest, GraphError, LinkKind, MatchLogic, NodeCounts, NodeKind, RankingMode,
    RelationshipListing, RelationshipQuery, SearchField, Selection,
};

// =============================================================================
// Graph Data Models
// =============================================================================

/// A builder result shaped for graph front-ends.
#[derive(Debug, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// A node in the graph payload.
#[derive(Debug, Serialize)]
pub struct GraphNode {
    /// Node id within the active scope.
    pub key: String,
    pub attributes: NodeAttributes,
}

/// Node attributes for display.
#[derive(Debug, Serialize)]
pub struct NodeAttributes {
    pub label: String,
    /// Node kind (section, entity, concept, index).
    pub category: String,
    /// Hex color derived from the kind.
    pub color: String,
    /// Size derived from the kind.
    pub size: u32,
    pub degree: u32,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

/// An edge in the graph payload.
#[derive(Debug, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<EdgeAttributes>,
}

#[derive(Debug, Serialize)]
pub struct EdgeAttributes {
    /// Link kind (definition, reference, hierarchy).
    pub relationship: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Number of links folded into this edge.
    pub count: usize,
}

// =============================================================================
// Title and View Models
// =============================================================================

/// A manifest title, flagged when it is the loaded one.
#[derive(Debug, Serialize)]
pub struct TitleSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub loaded: bool,
}

/// Response for `POST /api/titles/{id}`.
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub title: String,
    /// False when a newer operation overtook this load.
    pub applied: bool,
    pub nodes: usize,
    pub links: usize,
    pub scopes: Vec<String>,
}

/// Response for `POST /api/scope/{scope}`.
#[derive(Debug, Serialize)]
pub struct ScopeResponse {
    pub scope: String,
    pub applied: bool,
    /// The active search re-run under the new scope, if there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SearchResponse>,
}

/// Response for `POST /api/search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub applied: bool,
    pub matched_count: usize,
    pub truncated: bool,
    pub graph: GraphData,
}

/// Response for `GET /api/view`.
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub title: Option<String>,
    pub scope: String,
    /// Present only while the selection belongs to the active scope.
    pub selection: Option<Selection>,
    pub request: Option<BuilderRequest>,
    pub result: Option<SearchResponse>,
}

/// Error body for every failed call.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// =============================================================================
// Search Models
// =============================================================================

/// Body of `POST /api/search`. Omitted settings come from the `[builder]`
/// config section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchBody {
    pub terms: Vec<String>,
    pub fields: Option<Vec<SearchField>>,
    pub node_kinds: Option<Vec<NodeKind>>,
    pub edge_kinds: Option<Vec<LinkKind>>,
    pub logic: Option<MatchLogic>,
    pub expansion_depth: Option<usize>,
    pub max_nodes_per_expansion: Option<usize>,
    pub max_total_nodes: Option<usize>,
    pub ranking: Option<RankingMode>,
}

impl SearchBody {
    pub fn into_request(self, defaults: &BuilderConfig) -> BuilderRequest {
        let mut request = BuilderRequest::from_config(defaults, self.terms);
        if let Some(fields) = self.fields {
            request = request.with_fields(fields);
        }
        if let Some(kinds) = self.node_kinds {
            request = request.with_node_kinds(kinds);
        }
        if let Some(kinds) = self.edge_kinds {
            request = request.with_edge_kinds(kinds);
        }
        if let Some(logic) = self.logic {
            request.logic = logic;
        }
        if let Some(depth) = self.expansion_depth {
            request.expansion_depth = depth;
        }
        if let Some(per) = self.max_nodes_per_expansion {
            request.max_nodes_per_expansion = per;
        }
        if let Some(max) = self.max_total_nodes {
            request.max_total_nodes = max;
        }
        if let Some(ranking) = self.ranking {
            request.ranking = ranking;
        }
        request
    }
}

/// Query parameters for `GET /api/node/{id}`.
#[derive(Debug, Deserialize)]
pub struct NodeQuery {
    /// Defaults to the active scope.
    pub scope: Option<String>,
}

/// Query parameters for `GET /api/nodes`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_NODE_SEARCH_LIMIT
}

/// A single name search hit.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub key: String,
    pub label: String,
    pub node_type: String,
    pub color: String,
    pub degree: u32,
}

// =============================================================================
// Relationship Models
// =============================================================================

/// Query parameters for `GET /api/relationships`.
///
/// `edge_types` and `node_types` are comma-separated kind lists.
#[derive(Debug, Default, Deserialize)]
pub struct RelationshipParams {
    pub limit: Option<usize>,
    pub max_nodes: Option<usize>,
    pub edge_types: Option<String>,
    pub node_types: Option<String>,
}

impl RelationshipParams {
    pub fn into_query(self, defaults: &RelationshipConfig) -> Result<RelationshipQuery, GraphError> {
        Ok(RelationshipQuery {
            edge_kinds: self
                .edge_types
                .as_deref()
                .map(|s| parse_kinds(s, LinkKind::parse, "edge type"))
                .transpose()?,
            node_kinds: self
                .node_types
                .as_deref()
                .map(|s| parse_kinds(s, NodeKind::parse, "node type"))
                .transpose()?,
            limit: self.limit.unwrap_or(defaults.limit),
            max_nodes: Some(self.max_nodes.unwrap_or(defaults.max_nodes)),
        })
    }
}

fn parse_kinds<K: Ord>(
    list: &str,
    parse: fn(&str) -> Option<K>,
    what: &str,
) -> Result<BTreeSet<K>, GraphError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse(s).ok_or_else(|| GraphError::invalid(format!("unknown {} '{}'", what, s))))
        .collect()
}

/// Response for `GET /api/relationships`.
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    #[serde(flatten)]
    pub listing: RelationshipListing,
    pub counts: NodeCounts,
}
