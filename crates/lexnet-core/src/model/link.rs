//! Link (edge) types for the legal knowledge graph.

use serde::{Deserialize, Serialize};

use super::ids::{deserialize_opt_text, RawEndpoint};
use super::node::TimeScope;

/// Kind of relationship a link expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// A section defines a term or concept.
    Definition,
    /// A section cites another section or entity.
    Reference,
    /// Structural containment (title > chapter > section).
    Hierarchy,
}

impl LinkKind {
    pub const ALL: [LinkKind; 3] = [LinkKind::Definition, LinkKind::Reference, LinkKind::Hierarchy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Reference => "reference",
            Self::Hierarchy => "hierarchy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "definition" => Some(Self::Definition),
            "reference" => Some(Self::Reference),
            "hierarchy" => Some(Self::Hierarchy),
            _ => None,
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// A directed link between two node ids within one time scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLink")]
pub struct Link {
    pub source: String,
    pub target: String,
    #[serde(rename = "edge_type")]
    pub kind: LinkKind,
    #[serde(rename = "time")]
    pub scope: TimeScope,
    pub weight: f64,
    /// Free-text action label ("defines", "amends", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Link {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        kind: LinkKind,
        scope: impl Into<TimeScope>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            scope: scope.into(),
            weight: default_weight(),
            action: None,
            definition: None,
            location: None,
            timestamp: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Wire shape of a link before endpoint normalisation.
#[derive(Deserialize)]
struct RawLink {
    source: RawEndpoint,
    target: RawEndpoint,
    #[serde(rename = "edge_type", alias = "type")]
    kind: LinkKind,
    #[serde(rename = "time", alias = "time_scope")]
    scope: TimeScope,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    definition: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    timestamp: Option<String>,
}

impl From<RawLink> for Link {
    fn from(raw: RawLink) -> Self {
        Self {
            source: raw.source.into(),
            target: raw.target.into(),
            kind: raw.kind,
            scope: raw.scope,
            weight: raw.weight,
            action: raw.action,
            definition: raw.definition,
            location: raw.location,
            timestamp: raw.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_shapes_normalise() {
        let json = r#"[
            {"source": "s1", "target": 7, "edge_type": "reference", "time": "before"},
            {"source": {"id": "s1", "name": "Sec. 1"}, "target": {"id": 7}, "type": "definition", "time": "before", "weight": 3}
        ]"#;
        let links: Vec<Link> = serde_json::from_str(json).unwrap();
        assert_eq!(links[0].source, "s1");
        assert_eq!(links[0].target, "7");
        assert_eq!(links[0].weight, 1.0);
        assert_eq!(links[1].source, "s1");
        assert_eq!(links[1].target, "7");
        assert_eq!(links[1].kind, LinkKind::Definition);
        assert_eq!(links[1].weight, 3.0);
    }

    #[test]
    fn test_serializes_plain_ids() {
        let link = Link::new("a", "b", LinkKind::Hierarchy, "after").with_action("contains");
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["source"], "a");
        assert_eq!(value["edge_type"], "hierarchy");
        assert_eq!(value["time"], "after");
        assert_eq!(value["action"], "contains");
        assert!(value.get("definition").is_none());
    }
}
