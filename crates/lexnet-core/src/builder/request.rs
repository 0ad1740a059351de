//! Builder request types and validation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::{
    BuilderConfig, DEFAULT_EXPANSION_DEPTH, DEFAULT_MAX_NODES_PER_EXPANSION, DEFAULT_MAX_TOTAL_NODES,
};
use crate::error::GraphError;
use crate::model::{LinkKind, NodeKind};

/// A textual node field eligible for keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// Raw statutory text.
    Text,
    FullName,
    DisplayLabel,
    Definition,
    /// The kind label ("Section", "Concept", ...).
    NodeKind,
}

impl SearchField {
    pub const ALL: [SearchField; 5] = [
        SearchField::Text,
        SearchField::FullName,
        SearchField::DisplayLabel,
        SearchField::Definition,
        SearchField::NodeKind,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "text" => Some(Self::Text),
            "full_name" | "name" => Some(Self::FullName),
            "display_label" | "label" => Some(Self::DisplayLabel),
            "definition" => Some(Self::Definition),
            "node_kind" | "kind" | "type" => Some(Self::NodeKind),
            _ => None,
        }
    }
}

/// How multiple search terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLogic {
    /// Every term must be found.
    #[default]
    #[serde(alias = "and", alias = "all")]
    Conjunctive,
    /// Any term suffices.
    #[serde(alias = "or", alias = "any")]
    Disjunctive,
}

/// Score used to order and cap candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    /// Dataset-wide degree computed at load.
    #[default]
    Global,
    /// Degree within the node set assembled so far.
    Subgraph,
}

/// A keyword search plus expansion budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderRequest {
    pub terms: Vec<String>,
    pub fields: BTreeSet<SearchField>,
    pub node_kinds: BTreeSet<NodeKind>,
    pub edge_kinds: BTreeSet<LinkKind>,
    pub logic: MatchLogic,
    pub expansion_depth: usize,
    /// Neighbours admitted per expanded node.
    pub max_nodes_per_expansion: usize,
    pub max_total_nodes: usize,
    pub ranking: RankingMode,
}

impl Default for BuilderRequest {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            fields: SearchField::ALL.into_iter().collect(),
            node_kinds: NodeKind::ALL.into_iter().collect(),
            edge_kinds: LinkKind::ALL.into_iter().collect(),
            logic: MatchLogic::default(),
            expansion_depth: DEFAULT_EXPANSION_DEPTH,
            max_nodes_per_expansion: DEFAULT_MAX_NODES_PER_EXPANSION,
            max_total_nodes: DEFAULT_MAX_TOTAL_NODES,
            ranking: RankingMode::default(),
        }
    }
}

impl BuilderRequest {
    /// A request for `terms` with default filters and budgets.
    pub fn new<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A request for `terms` using configured defaults.
    pub fn from_config<I, T>(config: &BuilderConfig, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            fields: config.fields.iter().copied().collect(),
            node_kinds: NodeKind::ALL.into_iter().collect(),
            edge_kinds: LinkKind::ALL.into_iter().collect(),
            logic: config.logic,
            expansion_depth: config.expansion_depth,
            max_nodes_per_expansion: config.max_nodes_per_expansion,
            max_total_nodes: config.max_total_nodes,
            ranking: config.ranking,
        }
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = SearchField>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    pub fn with_node_kinds(mut self, kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        self.node_kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_edge_kinds(mut self, kinds: impl IntoIterator<Item = LinkKind>) -> Self {
        self.edge_kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_logic(mut self, logic: MatchLogic) -> Self {
        self.logic = logic;
        self
    }

    pub fn with_ranking(mut self, ranking: RankingMode) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn with_expansion(mut self, depth: usize, per_expansion: usize) -> Self {
        self.expansion_depth = depth;
        self.max_nodes_per_expansion = per_expansion;
        self
    }

    pub fn with_max_total_nodes(mut self, max: usize) -> Self {
        self.max_total_nodes = max;
        self
    }

    /// Check the request and return its lowercased, non-blank terms.
    pub fn validate(&self) -> Result<Vec<String>, GraphError> {
        if self.fields.is_empty() {
            return Err(GraphError::invalid("no fields selected for matching"));
        }
        if self.node_kinds.is_empty() {
            return Err(GraphError::invalid("no node kinds allowed"));
        }
        if self.max_total_nodes == 0 {
            return Err(GraphError::invalid("max_total_nodes must be at least 1"));
        }

        let needles: Vec<String> = self
            .terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if needles.is_empty() {
            return Err(GraphError::invalid("at least one search term is required"));
        }

        Ok(needles)
    }
}
