//! Node types for the legal knowledge graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{deserialize_id, deserialize_opt_text};

/// Tag naming one of the parallel dataset variants (before/after a change).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeScope(String);

impl TimeScope {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TimeScope {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for TimeScope {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// Semantic kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Section,
    Entity,
    Concept,
    Index,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Section,
        NodeKind::Entity,
        NodeKind::Concept,
        NodeKind::Index,
    ];

    /// Human-readable label, also searchable as a node field.
    pub fn label(self) -> &'static str {
        match self {
            Self::Section => "Section",
            Self::Entity => "Entity",
            Self::Concept => "Concept",
            Self::Index => "Index",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "section" => Some(Self::Section),
            "entity" => Some(Self::Entity),
            "concept" => Some(Self::Concept),
            "index" => Some(Self::Index),
            _ => None,
        }
    }
}

/// Where a node sits in the code's structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    #[serde(default, deserialize_with = "deserialize_opt_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text", skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text", skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text", skip_serializing_if = "Option::is_none")]
    pub subchapter: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text", skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text", skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
}

/// A statutory section, referenced entity, concept or index entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique within its time scope.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Full display name.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "node_type", alias = "type")]
    pub kind: NodeKind,
    #[serde(rename = "time", alias = "time_scope")]
    pub scope: TimeScope,
    /// Link endpoint count across the whole merged dataset.
    /// Recomputed on load; any value in the source file is overwritten.
    #[serde(default)]
    pub degree: u32,
    #[serde(flatten)]
    pub hierarchy: Hierarchy,
    /// Raw statutory text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Short label shown instead of the full name, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
}

impl Node {
    /// Create a bare node; mostly useful for fixtures.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: NodeKind,
        scope: impl Into<TimeScope>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            scope: scope.into(),
            degree: 0,
            hierarchy: Hierarchy::default(),
            text: None,
            definition: None,
            display_label: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = Some(label.into());
        self
    }

    /// The label to show, falling back to the full name.
    pub fn label(&self) -> &str {
        self.display_label.as_deref().unwrap_or(&self.name)
    }
}
