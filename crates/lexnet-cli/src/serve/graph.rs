//! Conversion of builder results into the graph payload.
//!
//! Colors and sizes are derived here from node kinds; the core model
//! carries no presentation attributes.

use std::collections::HashMap;

use lexnet_core::{BuilderResult, Link, LinkKind, Node, NodeKind};

use super::models::{EdgeAttributes, GraphData, GraphEdge, GraphNode, NodeAttributes};

// =============================================================================
// Node Styling
// =============================================================================

/// Hex color for a node kind.
pub fn get_category_color(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Section => "#0969da",  // Blue
        NodeKind::Entity => "#1a7f37",   // Green
        NodeKind::Concept => "#9a6700",  // Orange
        NodeKind::Index => "#8250df",    // Purple
    }
}

/// Node size for a node kind.
pub fn get_category_size(kind: NodeKind) -> u32 {
    match kind {
        NodeKind::Section => 12,
        NodeKind::Concept => 10,
        NodeKind::Entity => 8,
        NodeKind::Index => 6,
    }
}

// =============================================================================
// Graph Builder
// =============================================================================

/// Builder for constructing graph data from builder results.
///
/// Parallel links of the same kind collapse into one edge with a count.
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    edge_slots: HashMap<(String, String, LinkKind), usize>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            edge_slots: HashMap::new(),
        }
    }

    /// Build graph data from a builder result.
    pub fn build_from_result(mut self, result: &BuilderResult) -> GraphData {
        for node in &result.nodes {
            self.add_node(node);
        }
        for link in &result.links {
            self.add_edge(link);
        }

        GraphData {
            nodes: self.nodes,
            edges: self.edges,
        }
    }

    fn add_node(&mut self, node: &Node) {
        self.nodes.push(GraphNode {
            key: node.id.clone(),
            attributes: NodeAttributes {
                label: node.label().to_string(),
                category: node.kind.label().to_lowercase(),
                color: get_category_color(node.kind).to_string(),
                size: get_category_size(node.kind),
                degree: node.degree,
                scope: node.scope.to_string(),
                section: node.hierarchy.section.clone(),
            },
        });
    }

    fn add_edge(&mut self, link: &Link) {
        let key = (link.source.clone(), link.target.clone(), link.kind);
        if let Some(&i) = self.edge_slots.get(&key) {
            if let Some(attributes) = self.edges[i].attributes.as_mut() {
                attributes.count += 1;
            }
            return;
        }

        self.edge_slots.insert(key, self.edges.len());
        self.edges.push(GraphEdge {
            source: link.source.clone(),
            target: link.target.clone(),
            attributes: Some(EdgeAttributes {
                relationship: link.kind.as_str().to_string(),
                action: link.action.clone(),
                count: 1,
            }),
        });
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
