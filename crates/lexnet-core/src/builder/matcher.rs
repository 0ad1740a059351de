//! Case-insensitive keyword matching over node fields.

use crate::model::Node;

use super::request::{MatchLogic, SearchField};

/// Tests nodes against a validated set of lowercased terms.
pub(crate) struct Matcher {
    needles: Vec<String>,
    fields: Vec<SearchField>,
    logic: MatchLogic,
}

impl Matcher {
    pub(crate) fn new(
        needles: Vec<String>,
        fields: impl IntoIterator<Item = SearchField>,
        logic: MatchLogic,
    ) -> Self {
        Self {
            needles,
            fields: fields.into_iter().collect(),
            logic,
        }
    }

    /// A term may be found in any eligible field; under conjunctive logic
    /// different terms may come from different fields.
    pub(crate) fn matches(&self, node: &Node) -> bool {
        let haystacks: Vec<String> = self
            .fields
            .iter()
            .filter_map(|&f| field_text(node, f))
            .map(str::to_lowercase)
            .collect();

        let found = |needle: &String| haystacks.iter().any(|h| h.contains(needle.as_str()));

        match self.logic {
            MatchLogic::Conjunctive => self.needles.iter().all(found),
            MatchLogic::Disjunctive => self.needles.iter().any(found),
        }
    }
}

fn field_text(node: &Node, field: SearchField) -> Option<&str> {
    match field {
        SearchField::Text => node.text.as_deref(),
        SearchField::FullName => Some(node.name.as_str()),
        SearchField::DisplayLabel => node.display_label.as_deref(),
        SearchField::Definition => node.definition.as_deref(),
        SearchField::NodeKind => Some(node.kind.label()),
    }
}
